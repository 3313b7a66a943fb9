use std::time::Duration;

/// Poll `condition` until it holds. Under a paused clock the sleeps advance
/// virtual time, so this never waits in real time.
pub async fn wait_until<F>(what: &str, condition: F)
where
    F: Fn() -> bool,
{
    for _ in 0..1_000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {what}");
}
