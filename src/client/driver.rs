//! Async driver
//!
//! Runs a step-driven transfer to completion on a tokio runtime, yielding
//! to other tasks between steps instead of blocking the thread.

use log::debug;

use crate::client::{FtpClient, Status};
use crate::storage::FileStore;
use crate::transfer::{Direction, Mode};
use crate::transport::Transport;

/// Transfers `local_path` to or from `remote_path`, sleeping for the
/// configured step interval between steps.
///
/// A request rejected up front (busy, no session, local file) returns at
/// once without touching any transfer already in flight.
pub async fn transfer_async<T: Transport, S: FileStore>(
    client: &mut FtpClient<T, S>,
    local_path: &str,
    remote_path: &str,
    direction: Direction,
) -> Status {
    let status = client.transfer(local_path, remote_path, direction, Mode::StepDriven);
    if status.is_error() {
        return status;
    }

    let interval = client.settings().step_interval();
    let mut steps: u64 = 1;
    while client.state().is_active() {
        tokio::time::sleep(interval).await;
        client.step();
        steps += 1;
    }

    debug!("Transfer concluded after {} steps", steps);
    client.status().clone()
}
