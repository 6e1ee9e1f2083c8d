//! Native [`PlayerHost`]: HTTP fetches on tokio tasks, results fed back to the
//! player through a channel so a single task owns it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use scrollreel_core::{FrameBuffer, ReelError, ReelResult};
use scrollreel_player::software::decode_frame;
use scrollreel_player::{
    FrameRequest, Generation, LoadEvent, LoadTicket, PlayerHost, ReadyCause, ScrollPlayer, Surface,
};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;

/// Something the player has to hear about.
#[derive(Debug)]
pub enum HostEvent {
    Frame {
        ticket: LoadTicket,
        outcome: ReelResult<FrameBuffer>,
    },
    SafetyTimeout(Generation),
}

pub struct TokioHost {
    client: reqwest::Client,
    permits: Arc<Semaphore>,
    events: mpsc::UnboundedSender<HostEvent>,
    fetches: Vec<(Generation, JoinHandle<()>)>,
    timer: Option<(Generation, JoinHandle<()>)>,
}

/// Longest a single frame download may take before it counts as failed.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

fn build_client(timeout: Duration) -> ReelResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ReelError::Other(format!("failed to build HTTP client: {}", e)))
}

impl TokioHost {
    /// At most `concurrency` downloads run at once, each bounded by `timeout`.
    pub fn new(
        concurrency: usize,
        timeout: Duration,
    ) -> ReelResult<(Self, mpsc::UnboundedReceiver<HostEvent>)> {
        let (events, rx) = mpsc::unbounded_channel();
        let host = Self {
            client: build_client(timeout)?,
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
            events,
            fetches: Vec::new(),
            timer: None,
        };
        Ok((host, rx))
    }
}

impl Drop for TokioHost {
    fn drop(&mut self) {
        for (_, handle) in self.fetches.drain(..) {
            handle.abort();
        }
        if let Some((_, handle)) = self.timer.take() {
            handle.abort();
        }
    }
}

async fn fetch(client: &reqwest::Client, url: &str) -> ReelResult<FrameBuffer> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ReelError::asset(e.to_string(), url))?;
    let status = response.status();
    if !status.is_success() {
        return Err(ReelError::asset(format!("HTTP {}", status), url));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ReelError::asset(e.to_string(), url))?;
    tokio::task::spawn_blocking(move || decode_frame(&bytes))
        .await
        .map_err(|e| ReelError::Other(format!("decode task failed: {}", e)))?
}

impl PlayerHost for TokioHost {
    fn fetch_frame(&mut self, request: FrameRequest) {
        let FrameRequest { ticket, url } = request;

        // Downloads for an older frame set are no longer wanted.
        self.fetches.retain(|(generation, handle)| {
            if *generation != ticket.generation {
                handle.abort();
                return false;
            }
            true
        });

        let client = self.client.clone();
        let permits = self.permits.clone();
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            let outcome = match permits.acquire_owned().await {
                Ok(_permit) => fetch(&client, &url).await,
                Err(_) => Err(ReelError::asset("fetch pool closed", &url)),
            };
            let _ = events.send(HostEvent::Frame { ticket, outcome });
        });
        self.fetches.push((ticket.generation, handle));
    }

    fn arm_safety_timer(&mut self, generation: Generation, after: Duration) {
        if let Some((_, old)) = self.timer.take() {
            old.abort();
        }
        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = events.send(HostEvent::SafetyTimeout(generation));
        });
        self.timer = Some((generation, handle));
    }

    fn disarm_safety_timer(&mut self, generation: Generation) {
        if self.timer.as_ref().map(|(g, _)| *g) == Some(generation) {
            if let Some((_, handle)) = self.timer.take() {
                handle.abort();
            }
        }
    }
}

/// How a load went.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub cause: Option<ReadyCause>,
    pub ready_after: Option<Duration>,
    pub elapsed: Duration,
    pub loaded: usize,
    pub failed: usize,
    pub pending: usize,
}

/// Feed host events into `player` until `done` says to stop or the channel
/// closes.
pub async fn drive<S, H>(
    player: &mut ScrollPlayer<S>,
    host: &mut H,
    events: &mut mpsc::UnboundedReceiver<HostEvent>,
    mut done: impl FnMut(&ScrollPlayer<S>) -> bool,
) -> LoadReport
where
    S: Surface<Image = FrameBuffer>,
    H: PlayerHost,
{
    let started = Instant::now();
    let mut cause = None;
    let mut ready_after = None;

    while !done(player) {
        let Some(event) = events.recv().await else {
            break;
        };
        let outcome = match event {
            HostEvent::Frame { ticket, outcome } => player.on_frame_complete(ticket, outcome, host),
            HostEvent::SafetyTimeout(generation) => player.on_safety_timeout(generation),
        };
        if let LoadEvent::BecameReady(why) = outcome {
            cause = Some(why);
            ready_after = Some(started.elapsed());
        }
    }

    let (loaded, failed, pending) = player
        .frames()
        .map(|f| (f.loaded_count(), f.failed_count(), f.pending_count()))
        .unwrap_or_default();
    LoadReport {
        cause,
        ready_after,
        elapsed: started.elapsed(),
        loaded,
        failed,
        pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrollreel_core::{Color, SequenceConfig, SequenceTuning};
    use scrollreel_player::{SoftwareSurface, ViewportSize};

    #[derive(Default)]
    struct QuietHost {
        requests: Vec<FrameRequest>,
    }

    impl PlayerHost for QuietHost {
        fn fetch_frame(&mut self, request: FrameRequest) {
            self.requests.push(request);
        }
        fn arm_safety_timer(&mut self, _: Generation, _: Duration) {}
        fn disarm_safety_timer(&mut self, _: Generation) {}
    }

    fn small_sequence() -> SequenceConfig {
        SequenceConfig::new(
            "https://cdn.test/seq/",
            &SequenceTuning {
                frame_count: 4,
                load_threshold: 0.5,
                safety_timeout_ms: 2000,
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_stalled_download_times_out() {
        // Accepts connections and never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = build_client(Duration::from_millis(200)).unwrap();
        let url = format!("http://{}/frame_000_delay-0.04s.png", addr);
        let started = Instant::now();
        let err = fetch(&client, &url).await.unwrap_err();
        assert!(matches!(err, ReelError::Asset { .. }), "{}", err);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_drive_until_ready() {
        let mut player = ScrollPlayer::mount(SoftwareSurface::new(0, 0), ViewportSize::new(4, 4));
        let mut host = QuietHost::default();
        player.load(small_sequence(), &mut host).unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        for request in &host.requests[..3] {
            tx.send(HostEvent::Frame {
                ticket: request.ticket,
                outcome: Ok(FrameBuffer::solid(2, 2, &Color::BLACK)),
            })
            .unwrap();
        }

        let report = drive(&mut player, &mut host, &mut rx, |p| p.is_ready()).await;
        assert_eq!(report.cause, Some(ReadyCause::Threshold));
        assert_eq!((report.loaded, report.failed, report.pending), (2, 0, 2));
    }

    #[tokio::test]
    async fn test_drive_until_settled_after_timeout() {
        let mut player = ScrollPlayer::mount(SoftwareSurface::new(0, 0), ViewportSize::new(4, 4));
        let mut host = QuietHost::default();
        player.load(small_sequence(), &mut host).unwrap();
        let generation = player.generation().unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send(HostEvent::SafetyTimeout(generation)).unwrap();
        for request in &host.requests {
            tx.send(HostEvent::Frame {
                ticket: request.ticket,
                outcome: Err(ReelError::asset("HTTP 404 Not Found", &request.url)),
            })
            .unwrap();
        }
        drop(tx);

        let report = drive(&mut player, &mut host, &mut rx, |p| {
            p.frames().map(|f| f.is_settled()).unwrap_or(false)
        })
        .await;
        assert_eq!(report.cause, Some(ReadyCause::SafetyTimeout));
        assert_eq!((report.loaded, report.failed, report.pending), (0, 4, 0));
        assert!(player.is_ready());
    }
}
