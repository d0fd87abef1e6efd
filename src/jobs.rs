use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::config::Config;
use crate::store::Store;

/// Outbound external-API work submitted by route handlers.
#[derive(Debug, Clone)]
pub enum Job {
    Summarize { post_id: i64 },
    Translate { post_id: i64, lang: String },
    Draw { prompt: String },
}

impl Job {
    fn name(&self) -> &'static str {
        match self {
            Job::Summarize { .. } => "summarize",
            Job::Translate { .. } => "translate",
            Job::Draw { .. } => "draw",
        }
    }
}

/// Bounded worker pool with a drop-on-overflow policy. A fixed number of
/// worker threads drain a fixed-capacity channel, which caps the number of
/// parallel outbound API calls — backpressure against third-party rate
/// limits. When the channel is full, submit fails and the caller reports
/// the overload; there is no retry and a failed job is only logged.
pub struct JobQueue {
    tx: SyncSender<Job>,
}

#[derive(Debug, PartialEq)]
pub enum SubmitError {
    QueueFull,
    Closed,
}

impl JobQueue {
    /// Spawn `workers` threads sharing one receiver and return the handle
    /// used for submission.
    pub fn start(
        workers: usize,
        capacity: usize,
        store: Arc<dyn Store>,
        config: Arc<Config>,
    ) -> Self {
        let (tx, rx) = sync_channel::<Job>(capacity);
        let rx = Arc::new(Mutex::new(rx));

        for n in 0..workers.max(1) {
            let rx = Arc::clone(&rx);
            let store = Arc::clone(&store);
            let config = Arc::clone(&config);
            thread::Builder::new()
                .name(format!("job-worker-{}", n))
                .spawn(move || worker_loop(rx, store, config))
                .expect("failed to spawn job worker");
        }

        JobQueue { tx }
    }

    pub fn submit(&self, job: Job) -> Result<(), SubmitError> {
        match self.tx.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(job)) => {
                log::warn!("[jobs] Queue full, dropping {} job", job.name());
                Err(SubmitError::QueueFull)
            }
            Err(TrySendError::Disconnected(_)) => Err(SubmitError::Closed),
        }
    }
}

fn worker_loop(rx: Arc<Mutex<Receiver<Job>>>, store: Arc<dyn Store>, config: Arc<Config>) {
    loop {
        let job = {
            let guard = match rx.lock() {
                Ok(g) => g,
                Err(_) => return,
            };
            match guard.recv() {
                Ok(j) => j,
                Err(_) => return, // queue dropped, shut down
            }
        };

        let name = job.name();
        if let Err(e) = run_job(&*store, &config, job) {
            log::error!("[jobs] {} job failed: {}", name, e);
        }
    }
}

fn run_job(store: &dyn Store, config: &Config, job: Job) -> Result<(), String> {
    match job {
        Job::Summarize { post_id } => {
            let post = store
                .post_find_by_id(post_id)
                .ok_or_else(|| format!("post {} not found", post_id))?;
            let summary = crate::ai::summarize(config, &post.body).map_err(|e| e.0)?;
            store.post_set_summary(post_id, &summary)?;
            log::info!("[jobs] Summarized post {}", post_id);
            Ok(())
        }
        Job::Translate { post_id, lang } => {
            let post = store
                .post_find_by_id(post_id)
                .ok_or_else(|| format!("post {} not found", post_id))?;
            let translated = crate::ai::translate(config, &post.body, &lang).map_err(|e| e.0)?;
            store.post_translation_upsert(post_id, &lang, &translated)?;
            log::info!("[jobs] Translated post {} into {}", post_id, lang);
            Ok(())
        }
        Job::Draw { prompt } => {
            let url = crate::ai::draw(config, &prompt).map_err(|e| e.0)?;
            log::info!("[jobs] Generated image: {}", url);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_drops_on_overflow() {
        // A queue with no workers draining it fills up at capacity
        let (tx, _rx) = sync_channel::<Job>(2);
        let queue = JobQueue { tx };

        assert!(queue.submit(Job::Draw { prompt: "a".into() }).is_ok());
        assert!(queue.submit(Job::Draw { prompt: "b".into() }).is_ok());
        assert_eq!(
            queue.submit(Job::Draw { prompt: "c".into() }),
            Err(SubmitError::QueueFull)
        );
    }

    #[test]
    fn test_submit_after_close() {
        let (tx, rx) = sync_channel::<Job>(1);
        drop(rx);
        let queue = JobQueue { tx };
        assert_eq!(
            queue.submit(Job::Draw { prompt: "x".into() }),
            Err(SubmitError::Closed)
        );
    }
}
