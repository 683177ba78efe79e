use std::{sync::Arc, time::Duration};

use tokio::{sync::Mutex, time::Instant};
use tracing::{debug, warn};

use crate::{
    blocking::{WaitOutcome, wait_for_handoff},
    commands::command_error::CommandError,
    key_value_store::KeyValueStore,
    resp::RespValue,
    state::State,
};

pub struct BlpopArguments {
    keys: Vec<String>,
    /// `None` blocks until an element arrives.
    timeout: Option<Duration>,
}

impl BlpopArguments {
    pub fn parse(arguments: &[String]) -> Result<Self, CommandError> {
        let [keys @ .., timeout] = arguments else {
            return Err(CommandError::wrong_number_of_arguments("blpop"));
        };

        if keys.is_empty() {
            return Err(CommandError::wrong_number_of_arguments("blpop"));
        }

        let Ok(seconds) = timeout.parse::<f64>() else {
            return Err(CommandError::InvalidBLPopTimeout);
        };

        if seconds < 0.0 {
            return Err(CommandError::NegativeTimeout);
        }

        let timeout = if seconds == 0.0 {
            None
        } else {
            let Ok(duration) = Duration::try_from_secs_f64(seconds) else {
                return Err(CommandError::InvalidBLPopTimeout);
            };

            Some(duration)
        };

        Ok(Self {
            keys: keys.to_vec(),
            timeout,
        })
    }
}

fn popped_response(key: String, element: String) -> RespValue {
    RespValue::array_from_strings([key, element])
}

/// Pops from the first key, in argument order, that holds a non-empty list.
fn pop_first_available(
    store: &mut KeyValueStore,
    keys: &[String],
) -> Result<Option<(String, String)>, CommandError> {
    for key in keys {
        if let Some(element) = store.update_list(key, false, |list| list.pop_front())?.flatten() {
            return Ok(Some((key.clone(), element)));
        }
    }

    Ok(None)
}

/// BLPOP as a single attempt that never suspends, as run inside EXEC.
pub fn try_blpop(store: &mut KeyValueStore, arguments: &[String]) -> Result<RespValue, CommandError> {
    let blpop_arguments = BlpopArguments::parse(arguments)?;

    match pop_first_available(store, &blpop_arguments.keys)? {
        Some((key, element)) => Ok(popped_response(key, element)),
        None => Ok(RespValue::NullArray),
    }
}

/// Handles the Redis BLPOP command.
///
/// If one of the keys holds elements, pops from the first such key right
/// away. Otherwise registers the client as a waiter on every key and
/// suspends without holding any lock. A push to one of the keys hands an
/// element straight to the earliest registered waiter (see
/// [`crate::blocking::BlockedClients::serve`]).
///
/// # Returns
///
/// * `Ok(RespValue::Array)` - `[key, element]` for the popped element
/// * `Ok(RespValue::NullArray)` - If the timeout elapsed first, or the client
///   disconnected while blocked
/// * `Err(CommandError::WrongType)` - If a key checked before blocking is not a list
pub async fn blpop(
    client_address: &str,
    store: Arc<Mutex<KeyValueStore>>,
    state: Arc<Mutex<State>>,
    arguments: &[String],
) -> Result<RespValue, CommandError> {
    let blpop_arguments = BlpopArguments::parse(arguments)?;

    let deadline = blpop_arguments
        .timeout
        .map(|timeout| Instant::now() + timeout);

    let (waiter_id, mut receiver, disconnect_signal) = {
        let mut store_guard = store.lock().await;

        if let Some((key, element)) = pop_first_available(&mut store_guard, &blpop_arguments.keys)? {
            return Ok(popped_response(key, element));
        }

        // Registering while the store is still locked means no push can slip
        // in between the check above and the registration.
        let mut state_guard = state.lock().await;
        let (waiter_id, receiver) = state_guard
            .blocked_clients
            .register(client_address, &blpop_arguments.keys);

        (
            waiter_id,
            receiver,
            state_guard.disconnect_signal(client_address),
        )
    };

    debug!(client = client_address, keys = ?blpop_arguments.keys, "client blocked");

    match wait_for_handoff(&mut receiver, deadline, disconnect_signal).await {
        WaitOutcome::Ready((key, element)) => Ok(popped_response(key, element)),
        WaitOutcome::TimedOut => {
            let mut state_guard = state.lock().await;
            state_guard.blocked_clients.unregister(waiter_id);
            drop(state_guard);

            // An element may have been handed over between the timeout firing
            // and the waiter being unregistered.
            match receiver.try_recv() {
                Ok((key, element)) => Ok(popped_response(key, element)),
                Err(_) => {
                    debug!(client = client_address, "blocked client timed out");
                    Ok(RespValue::NullArray)
                }
            }
        }
        WaitOutcome::Disconnected => {
            let mut store_guard = store.lock().await;
            let mut state_guard = state.lock().await;
            state_guard.blocked_clients.unregister(waiter_id);

            // Nobody will read an element handed over to a closed connection,
            // so it goes back to the head of its list for the next client.
            if let Ok((key, element)) = receiver.try_recv() {
                debug!(
                    client = client_address,
                    key = %key,
                    "returning element of disconnected client"
                );

                match store_guard.update_list(&key, true, |list| list.push_front(element)) {
                    Ok(_) => {
                        store_guard.signal_ready(&key);
                        state_guard.serve_ready_keys(&mut store_guard);
                    }
                    Err(e) => warn!(
                        key = %key,
                        error = %e,
                        "could not return element of disconnected client"
                    ),
                }
            }

            Ok(RespValue::NullArray)
        }
    }
}
