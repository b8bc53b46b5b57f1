use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

const GENERIC_FETCH_ERROR: &str = "request failed";

#[derive(Debug)]
struct Completion<T> {
    generation: u64,
    result: Result<T, String>,
    elapsed: Duration,
}

#[derive(Debug)]
pub struct FetchTicket<T> {
    generation: u64,
    started_at: Instant,
    sender: Sender<Completion<T>>,
}

impl<T> FetchTicket<T> {
    pub fn complete(self, result: Result<T, String>) {
        let completion = Completion {
            generation: self.generation,
            result,
            elapsed: self.started_at.elapsed(),
        };
        let _ = self.sender.send(completion);
    }
}

#[derive(Debug)]
pub struct FetchCoordinator<A, T> {
    data: Option<T>,
    loading: bool,
    error: Option<String>,
    elapsed: Option<Duration>,
    generation: u64,
    last_args: Option<A>,
    sender: Sender<Completion<T>>,
    receiver: Receiver<Completion<T>>,
}

impl<A, T> FetchCoordinator<A, T> {
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            data: None,
            loading: false,
            error: None,
            elapsed: None,
            generation: 0,
            last_args: None,
            sender,
            receiver,
        }
    }

    #[must_use]
    pub fn starting(args: A) -> (Self, FetchTicket<T>) {
        let mut coordinator = Self::new();
        let ticket = coordinator.begin(args);
        (coordinator, ticket)
    }

    #[must_use]
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    #[must_use]
    pub fn last_args(&self) -> Option<&A> {
        self.last_args.as_ref()
    }

    pub fn begin(&mut self, args: A) -> FetchTicket<T> {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        self.last_args = Some(args);
        FetchTicket {
            generation: self.generation,
            started_at: Instant::now(),
            sender: self.sender.clone(),
        }
    }

    pub fn poll(&mut self) -> bool {
        let mut applied = false;
        while let Ok(completion) = self.receiver.try_recv() {
            if completion.generation != self.generation {
                continue;
            }

            self.loading = false;
            self.elapsed = Some(completion.elapsed);
            match completion.result {
                Ok(data) => {
                    self.data = Some(data);
                    self.error = None;
                }
                Err(message) => {
                    self.error = Some(if message.trim().is_empty() {
                        GENERIC_FETCH_ERROR.to_string()
                    } else {
                        message
                    });
                }
            }
            applied = true;
        }
        applied
    }
}

impl<A: Clone, T> FetchCoordinator<A, T> {
    pub fn retry(&mut self) -> Option<(A, FetchTicket<T>)> {
        let args = self.last_args.clone()?;
        let ticket = self.begin(args.clone());
        Some((args, ticket))
    }
}

impl<A, T> Default for FetchCoordinator<A, T> {
    fn default() -> Self {
        Self::new()
    }
}
