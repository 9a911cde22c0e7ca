//! Trailing-edge debouncing of a changing value.
//!
//! Values pushed into a [`Debouncer`] are forwarded to its output channel
//! only once no newer value has arrived for the whole window. Dropping or
//! cancelling the debouncer discards whatever is pending.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::trace;

pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<T>,
    task: JoinHandle<()>,
}

impl<T> Debouncer<T>
where
    T: Clone + PartialEq + Send + 'static,
{
    /// Starts the debounce task. `initial` is the value the output is
    /// considered to hold already; settling back on it emits nothing.
    pub fn spawn(initial: T, window: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (input, mut input_rx) = mpsc::unbounded_channel::<T>();
        let (output, output_rx) = mpsc::unbounded_channel::<T>();

        let task = tokio::spawn(async move {
            let mut settled = initial;
            while let Some(mut pending) = input_rx.recv().await {
                loop {
                    tokio::select! {
                        next = input_rx.recv() => match next {
                            Some(value) => pending = value,
                            None => return,
                        },
                        _ = sleep(window) => break,
                    }
                }

                if pending == settled {
                    trace!("debounced value unchanged, skipping");
                    continue;
                }
                settled = pending.clone();
                if output.send(pending).is_err() {
                    return;
                }
            }
        });

        (Self { input, task }, output_rx)
    }

    /// Feeds a new raw value, restarting the quiescence window.
    pub fn push(&self, value: T) -> bool {
        self.input.send(value).is_ok()
    }

    /// Stops the debouncer without emitting the pending value.
    pub fn cancel(self) {
        self.task.abort();
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    const WINDOW: Duration = Duration::from_millis(500);

    #[tokio::test(start_paused = true)]
    async fn rapid_edits_emit_only_the_final_value() {
        let (debouncer, mut output) = Debouncer::spawn(String::new(), WINDOW);

        for raw in ["bat", "bat ", "batman"] {
            debouncer.push(raw.to_string());
            sleep(Duration::from_millis(100)).await;
        }
        let last_edit = Instant::now() - Duration::from_millis(100);

        assert_eq!(output.recv().await.as_deref(), Some("batman"));
        assert!(Instant::now() - last_edit >= WINDOW);

        sleep(WINDOW * 4).await;
        assert!(output.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn separated_edits_emit_each_value() {
        let (debouncer, mut output) = Debouncer::spawn(String::new(), WINDOW);

        debouncer.push("alien".to_string());
        assert_eq!(output.recv().await.as_deref(), Some("alien"));

        debouncer.push("aliens".to_string());
        assert_eq!(output.recv().await.as_deref(), Some("aliens"));
    }

    #[tokio::test(start_paused = true)]
    async fn settling_on_the_current_value_emits_nothing() {
        let (debouncer, mut output) = Debouncer::spawn(String::new(), WINDOW);

        debouncer.push("x".to_string());
        debouncer.push(String::new());
        sleep(WINDOW * 2).await;

        assert!(output.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_discards_pending_value() {
        let (debouncer, mut output) = Debouncer::spawn(String::new(), WINDOW);

        debouncer.push("heat".to_string());
        sleep(Duration::from_millis(200)).await;
        debouncer.cancel();
        sleep(WINDOW * 2).await;

        assert_eq!(output.recv().await, None);
    }
}
