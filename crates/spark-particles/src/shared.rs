//! Cross-thread handle for a system ticked by a timer and drawn by a renderer

use crate::render::Canvas;
use crate::system::{ParticleSystem, SystemState};
use spark_core::Millis;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared ownership of a [`ParticleSystem`].
///
/// Update and draw take the same lock, so a frame never sees the pool
/// half-updated.
#[derive(Clone)]
pub struct SharedParticleSystem {
    inner: Arc<Mutex<ParticleSystem>>,
}

impl SharedParticleSystem {
    pub fn new(system: ParticleSystem) -> Self {
        Self {
            inner: Arc::new(Mutex::new(system)),
        }
    }

    /// Exclusive access for emission control and queries.
    /// A panic on another holder doesn't wedge the handle.
    pub fn lock(&self) -> MutexGuard<'_, ParticleSystem> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Advance to `tick`. Returns whether the system is still running.
    ///
    /// The redraw callback fires after the lock is released, so it may draw
    /// through this handle.
    pub fn update(&self, tick: Millis) -> bool {
        let (running, redraw) = {
            let mut system = self.lock();
            let redraw = if system.step(tick) {
                system.take_redraw_callback()
            } else {
                None
            };
            (system.state() != SystemState::Idle, redraw)
        };
        if let Some(mut redraw) = redraw {
            redraw();
            self.lock().restore_redraw_callback(redraw);
        }
        running
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) {
        self.lock().draw(canvas);
    }

    pub fn cancel(&self) {
        self.lock().cancel();
    }
}

impl From<ParticleSystem> for SharedParticleSystem {
    fn from(system: ParticleSystem) -> Self {
        Self::new(system)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{ImageSource, Sprite};
    use crate::render::RecordingCanvas;
    use std::thread;

    #[test]
    fn ticked_from_another_thread() {
        let system =
            ParticleSystem::new_seeded(50, ImageSource::Single(Sprite::new("s", 4, 4)), 200, 1)
                .unwrap();
        let shared = SharedParticleSystem::new(system);
        shared.lock().emit(100, Some(300));

        let ticker = shared.clone();
        let handle = thread::spawn(move || {
            let mut t = 0;
            while ticker.update(t) {
                t += 10;
            }
            t
        });

        let mut canvas = RecordingCanvas::new();
        shared.draw(&mut canvas);
        assert!(canvas.calls.len() <= 50);

        let finished_at = handle.join().unwrap();
        assert!(finished_at > 300);
        let system = shared.lock();
        assert_eq!(system.state(), SystemState::Idle);
        assert_eq!(system.free_count(), 50);
    }

    #[test]
    fn redraw_callback_runs_unlocked() {
        use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

        let system =
            ParticleSystem::new_seeded(5, ImageSource::Single(Sprite::new("s", 4, 4)), 1000, 1)
                .unwrap();
        let shared = SharedParticleSystem::new(system);
        let handle = shared.clone();
        let unlocked = Arc::new(AtomicBool::new(false));
        let seen = Arc::clone(&unlocked);
        let drawn = Arc::new(AtomicUsize::new(0));
        let drawn_in_callback = Arc::clone(&drawn);
        shared.lock().set_redraw_callback(move || {
            seen.store(handle.inner.try_lock().is_ok(), Ordering::Relaxed);
            let mut canvas = RecordingCanvas::new();
            handle.draw(&mut canvas);
            drawn_in_callback.store(canvas.calls.len(), Ordering::Relaxed);
        });

        shared.lock().one_shot(3);
        assert!(shared.update(10));
        assert!(unlocked.load(Ordering::Relaxed));
        assert_eq!(drawn.load(Ordering::Relaxed), 3);

        // The callback is still installed for the next tick
        drawn.store(0, Ordering::Relaxed);
        assert!(shared.update(20));
        assert_eq!(drawn.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn cancel_through_handle() {
        let system =
            ParticleSystem::new_seeded(5, ImageSource::Single(Sprite::new("s", 4, 4)), 1000, 1)
                .unwrap();
        let shared = SharedParticleSystem::from(system);
        shared.lock().one_shot(5);
        assert!(shared.update(10));
        shared.cancel();
        assert!(!shared.update(20));
        assert_eq!(shared.lock().active_count(), 0);
    }
}
