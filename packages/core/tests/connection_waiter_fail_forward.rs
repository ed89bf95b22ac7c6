//! Connection-level waiter fail-forward behavior (spec.md §4.3 "Waiter
//! fail-forward rule", §8 invariant 6: "every pending waiter on a
//! connection and its streams is failed exactly once when the connection
//! enters `error` or `closed`"). Grounded on
//! `original_source/test/test_client_connection.cc`'s close-cancels-
//! pending-operations cases.

use nexusq_core::connection::{ConnectionState, OpenConnection};
use nexusq_core::error::{Error, QuicConnectionError};
use nexusq_core::stream::{Stream, Waiter};
use nexusq_core::wire::StreamId;

#[tokio::test]
async fn handle_error_fails_every_pending_stream_and_connect_waiter_with_the_latched_error() {
    let mut open = OpenConnection::default();

    let mut read_stream = Stream::new(StreamId::new(0).unwrap());
    let (read_waiter, read_rx) = Waiter::<usize>::new_async();
    read_stream.waiters.read.set(read_waiter).unwrap();
    open.streams.open.insert(read_stream.id, read_stream);

    let mut write_stream = Stream::new(StreamId::new(4).unwrap());
    let (write_waiter, write_rx) = Waiter::<usize>::new_async();
    write_stream.waiters.write.set(write_waiter).unwrap();
    open.streams.connecting.insert(write_stream.id, write_stream);

    let (connect_waiter, connect_rx) = Waiter::<()>::new_async();
    let mut slot = nexusq_core::stream::WaiterSlot::default();
    slot.set(connect_waiter).unwrap();
    open.connect_waiters.push(slot);

    let (accept_waiter, accept_rx) = Waiter::<()>::new_async();
    open.accept_waiter.set(accept_waiter).unwrap();

    let mut state = ConnectionState::Open(open);
    state.handle_error(Error::Connection(QuicConnectionError::TimedOut));

    assert!(matches!(state, ConnectionState::Error { ec: Error::Connection(QuicConnectionError::TimedOut) }));

    for rx in [read_rx, write_rx] {
        assert!(matches!(rx.await.unwrap(), Err(Error::Connection(QuicConnectionError::TimedOut))));
    }
    assert!(matches!(connect_rx.await.unwrap(), Err(Error::Connection(QuicConnectionError::TimedOut))));
    assert!(matches!(accept_rx.await.unwrap(), Err(Error::Connection(QuicConnectionError::TimedOut))));
}

#[tokio::test]
async fn a_second_handle_error_call_does_not_overwrite_the_first_latched_error() {
    let mut state = ConnectionState::Open(OpenConnection::default());
    state.handle_error(Error::Connection(QuicConnectionError::TimedOut));
    state.handle_error(Error::OperationAborted);

    match state {
        ConnectionState::Error { ec } => {
            assert!(matches!(ec, Error::Connection(QuicConnectionError::TimedOut)));
        }
        _ => panic!("expected an Error state"),
    }
}

#[tokio::test]
async fn closing_an_already_errored_connection_is_a_no_op_transition_to_closed() {
    let mut state = ConnectionState::Open(OpenConnection::default());
    state.handle_error(Error::OperationAborted);
    state.handle_closed();
    assert!(state.is_closed());
}
