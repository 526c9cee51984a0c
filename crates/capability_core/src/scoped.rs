//! Scoped acquisition of platform-owned resources.

use std::future::Future;

struct ReleaseGuard<R, F: FnOnce(R)> {
    resource: Option<R>,
    release: Option<F>,
}

impl<R, F: FnOnce(R)> ReleaseGuard<R, F> {
    fn resource(&self) -> &R {
        self.resource
            .as_ref()
            .expect("scoped resource held until release")
    }
}

impl<R, F: FnOnce(R)> Drop for ReleaseGuard<R, F> {
    fn drop(&mut self) {
        if let (Some(resource), Some(release)) = (self.resource.take(), self.release.take()) {
            release(resource);
        }
    }
}

/// Yields `resource` to `body` and runs `release` on every exit path.
///
/// This is the leak-proof companion to an adapter's raw acquire/release pair:
/// the release runs whether `body` resolves, returns an error value, or
/// unwinds.
pub async fn with_scoped<R, T, Rel, Body, Fut>(resource: R, release: Rel, body: Body) -> T
where
    Rel: FnOnce(R),
    Body: FnOnce(&R) -> Fut,
    Fut: Future<Output = T>,
{
    let guard = ReleaseGuard {
        resource: Some(resource),
        release: Some(release),
    };
    body(guard.resource()).await
}
