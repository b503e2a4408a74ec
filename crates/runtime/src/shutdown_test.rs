#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
        },
        time::Duration,
    };

    use tokio::{sync::oneshot, time};

    use crate::shutdown::{RunOutcome, run_until_shutdown};

    #[tokio::test]
    async fn completes_when_work_finishes_first() {
        let cleaned = Arc::new(AtomicBool::new(false));
        let flag = cleaned.clone();

        let outcome = run_until_shutdown(
            async { "completed" },
            std::future::pending::<()>(),
            move || async move { flag.store(true, Ordering::SeqCst) },
        )
        .await;

        assert_eq!(outcome, RunOutcome::Completed("completed"));
        assert!(cleaned.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn interrupts_long_running_work() {
        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(10)).await;
            let _ = tx.send(());
        });

        let cleaned = Arc::new(AtomicBool::new(false));
        let flag = cleaned.clone();
        let outcome = run_until_shutdown(
            time::sleep(Duration::from_secs(60)),
            async {
                let _ = rx.await;
            },
            move || async move { flag.store(true, Ordering::SeqCst) },
        )
        .await;

        assert_eq!(outcome, RunOutcome::Interrupted);
        assert!(cleaned.load(Ordering::SeqCst));
    }
}
