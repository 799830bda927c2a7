use axum::Extension;
use std::{
	future::Future,
	sync::atomic::{AtomicBool, Ordering},
};
use tokio::{signal, sync::watch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("shutdown handler already created")]
pub struct AlreadyCreatedError;

static CREATED: AtomicBool = AtomicBool::new(false);

/// Coordinates graceful shutdown between the signal handlers, the HTTP
/// server and the executor task. Cloning shares the underlying channel.
#[derive(Debug, Clone)]
pub struct Shutdown {
	sender: watch::Sender<bool>,
}

/// Handle exposed to routes through an axum `Extension`.
#[derive(Debug, Clone)]
pub struct Agent {
	sender: watch::Sender<bool>,
}

impl Agent {
	pub fn start(&self) {
		tracing::info!("Shutdown requested");
		self.sender.send_replace(true);
	}
}

impl Shutdown {
	/// Create the shutdown coordinator and register the process signal
	/// handlers. Only one may exist per process.
	///
	/// # Errors
	///
	/// Returns an error if a coordinator was already created.
	pub fn new() -> Result<Self, AlreadyCreatedError> {
		if CREATED.swap(true, Ordering::SeqCst) {
			return Err(AlreadyCreatedError);
		}

		let (sender, _) = watch::channel(false);

		let signal_sender = sender.clone();
		tokio::spawn(async move {
			register_handlers().await;
			signal_sender.send_replace(true);
		});

		Ok(Self { sender })
	}

	pub fn start(&self) {
		self.sender.send_replace(true);
	}

	/// Resolves once shutdown has been requested.
	pub fn handle(&self) -> impl Future<Output = ()> {
		let mut receiver = self.sender.subscribe();

		async move {
			while !*receiver.borrow_and_update() {
				if receiver.changed().await.is_err() {
					break;
				}
			}
		}
	}

	pub fn extension(&self) -> Extension<Agent> {
		Extension(Agent {
			sender: self.sender.clone(),
		})
	}
}

#[cfg(test)]
pub mod test_support {
	use super::Shutdown;
	use std::sync::OnceLock;

	/// The process-wide singleton guard means unit tests have to share one
	/// coordinator.
	pub fn shutdown() -> Shutdown {
		static SHUTDOWN: OnceLock<Shutdown> = OnceLock::new();

		SHUTDOWN.get_or_init(|| Shutdown::new().unwrap()).clone()
	}
}

fn register_handlers() -> impl Future<Output = ()> {
	let ctrl_c = async {
		signal::ctrl_c()
			.await
			.expect("failed to install Ctrl+C handler");
	};

	#[cfg(unix)]
	let terminate = async {
		signal::unix::signal(signal::unix::SignalKind::terminate())
			.expect("failed to install signal handler")
			.recv()
			.await;
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	async {
		tokio::select! {
			() = ctrl_c => {},
			_ = terminate => {},
		}

		tracing::info!("Received shutdown signal");
	}
}
