//! Hook dispatch on the listener decorator.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use connxray::net::{Addr, Connection, Listener, ListenerDecorator};

mod common;
use common::{assert_same_error, calls, error, new_log, push, MockListener};

#[test]
fn accept_with_passing_before_hook() {
    let log = new_log();
    let mut listener = MockListener::new(&log);
    listener.accept_error = Some((io::ErrorKind::ConnectionAborted, "chunky bacon"));

    let seen = Arc::new(Mutex::new(None));
    let mut decorated = ListenerDecorator::new(listener);
    let (l1, l2, seen_by_hook) = (log.clone(), log.clone(), Arc::clone(&seen));
    decorated
        .set_before_accept(move |_| {
            push(&l1, "before_accept");
            Ok(())
        })
        .set_after_accept(move |_, accepted| {
            push(&l2, "after_accept");
            let err = accepted.err().map(|e| (e.kind(), e.to_string()));
            *seen_by_hook.lock().unwrap() = err;
        });

    let err = decorated.accept().unwrap_err();
    assert_same_error(&err, io::ErrorKind::ConnectionAborted, "chunky bacon");
    assert_eq!(calls(&log), ["before_accept", "accept", "after_accept"]);
    assert_eq!(
        *seen.lock().unwrap(),
        Some((io::ErrorKind::ConnectionAborted, "chunky bacon".to_string()))
    );
}

#[test]
fn accept_with_failing_before_hook() {
    let log = new_log();
    let mut decorated = ListenerDecorator::new(MockListener::new(&log));
    let (l1, l2) = (log.clone(), log.clone());
    decorated
        .set_before_accept(move |_| {
            push(&l1, "before_accept");
            Err(error(io::ErrorKind::PermissionDenied, "not now"))
        })
        .set_after_accept(move |_, _| push(&l2, "after_accept"));

    let err = decorated.accept().unwrap_err();
    assert_same_error(&err, io::ErrorKind::PermissionDenied, "not now");
    assert_eq!(calls(&log), ["before_accept"]);
}

#[test]
fn accept_error_reaches_after_hook_without_before_hook() {
    let log = new_log();
    let mut listener = MockListener::new(&log);
    listener.accept_error = Some((io::ErrorKind::Other, "accept exploded"));

    let recorded = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&recorded);
    let mut decorated = ListenerDecorator::new(listener);
    decorated.set_after_accept(move |_, accepted| {
        if let Err(e) = accepted {
            sink.lock().unwrap().push(e.to_string());
        }
    });

    let err = decorated.accept().unwrap_err();
    assert_same_error(&err, io::ErrorKind::Other, "accept exploded");
    assert_eq!(*recorded.lock().unwrap(), ["accept exploded"]);
}

#[test]
fn accept_without_hooks_is_transparent() {
    let log = new_log();
    let mut decorated = ListenerDecorator::new(MockListener::new(&log));

    let conn = decorated.accept().unwrap();
    assert_eq!(calls(&log), ["accept"]);
    assert!(conn.after_read.is_none());
    assert!(conn.before_close.is_none());
    assert_eq!(conn.inner().remote_addr(), Some(common::remote_addr()));
}

#[test]
fn accepted_connection_starts_without_hooks() {
    let log = new_log();
    let mut decorated = ListenerDecorator::new(MockListener::new(&log));
    let unhooked = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&unhooked);
    decorated.set_after_accept(move |_, accepted| {
        let conn = accepted.unwrap();
        if conn.before_read.is_none() && conn.after_read.is_none() && conn.after_close.is_none() {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        conn.set_after_close(|_, _| {});
    });

    let first = decorated.accept().unwrap();
    let second = decorated.accept().unwrap();
    assert_eq!(unhooked.load(Ordering::SeqCst), 2);
    assert!(first.after_close.is_some());
    assert!(second.after_close.is_some());
}

#[test]
fn accept_hook_installs_read_accumulator() {
    let log = new_log();
    let listener = MockListener::new(&log).with_reads(&[10, 20, 30]);
    let total = Arc::new(AtomicUsize::new(0));

    let mut decorated = ListenerDecorator::new(listener);
    let acc = Arc::clone(&total);
    decorated.set_after_accept(move |_, accepted| {
        if let Ok(conn) = accepted {
            let acc = Arc::clone(&acc);
            conn.set_after_read(move |_, _, result| {
                if let Ok(n) = result {
                    acc.fetch_add(*n, Ordering::SeqCst);
                }
            });
        }
    });

    let mut conn = decorated.accept().unwrap();
    let mut buf = [0u8; 64];
    assert_eq!(conn.read(&mut buf).unwrap(), 10);
    assert_eq!(conn.read(&mut buf).unwrap(), 20);
    assert_eq!(conn.read(&mut buf).unwrap(), 30);
    assert_eq!(total.load(Ordering::SeqCst), 60);
}

#[test]
fn close_with_failing_before_hook() {
    let log = new_log();
    let mut decorated = ListenerDecorator::new(MockListener::new(&log));
    let (l1, l2) = (log.clone(), log.clone());
    decorated
        .set_before_close(move |_| {
            push(&l1, "before_close");
            Err(error(io::ErrorKind::WouldBlock, "still draining"))
        })
        .set_after_close(move |_, _| push(&l2, "after_close"));

    let err = decorated.close().unwrap_err();
    assert_same_error(&err, io::ErrorKind::WouldBlock, "still draining");
    assert_eq!(calls(&log), ["before_close"]);
}

#[test]
fn close_with_passing_before_hook_reports_underlying_error() {
    let log = new_log();
    let mut listener = MockListener::new(&log);
    listener.close_error = Some((io::ErrorKind::NotConnected, "already closed"));

    let seen = Arc::new(Mutex::new(None));
    let mut decorated = ListenerDecorator::new(listener);
    let (l1, l2, sink) = (log.clone(), log.clone(), Arc::clone(&seen));
    decorated
        .set_before_close(move |_| {
            push(&l1, "before_close");
            Ok(())
        })
        .set_after_close(move |_, result| {
            push(&l2, "after_close");
            *sink.lock().unwrap() = result.as_ref().err().map(|e| e.to_string());
        });

    let err = decorated.close().unwrap_err();
    assert_same_error(&err, io::ErrorKind::NotConnected, "already closed");
    assert_eq!(calls(&log), ["before_close", "close", "after_close"]);
    assert_eq!(seen.lock().unwrap().as_deref(), Some("already closed"));
}

#[test]
fn addr_always_queries_and_reports() {
    let log = new_log();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut decorated = ListenerDecorator::new(MockListener::new(&log));
    let (l1, sink) = (log.clone(), Arc::clone(&seen));
    decorated.set_after_addr(move |_, addr| {
        push(&l1, "after_addr");
        sink.lock().unwrap().push(addr.cloned());
    });

    assert_eq!(decorated.addr(), Some(common::local_addr()));
    assert_eq!(calls(&log), ["addr", "after_addr"]);

    let mut unbound = MockListener::new(&log);
    unbound.addr = None;
    let mut decorated = ListenerDecorator::new(unbound);
    let sink = Arc::clone(&seen);
    decorated.set_after_addr(move |_, addr| sink.lock().unwrap().push(addr.cloned()));
    assert_eq!(decorated.addr(), None);

    assert_eq!(*seen.lock().unwrap(), vec![Some(common::local_addr()), None::<Addr>]);
}

#[test]
fn hooks_receive_the_decorator() {
    let log = new_log();
    let mut decorated = ListenerDecorator::new(MockListener::new(&log));
    let l1 = log.clone();
    decorated.set_before_accept(move |listener| {
        push(&l1, "before_accept");
        listener.inner().addr().map(|_| ()).ok_or_else(|| error(io::ErrorKind::Other, "unbound"))
    });

    decorated.accept().unwrap();
    assert_eq!(calls(&log), ["before_accept", "addr", "accept"]);
}

#[test]
fn hooks_can_be_replaced_and_cleared() {
    let log = new_log();
    let mut decorated = ListenerDecorator::new(MockListener::new(&log));
    decorated.set_before_accept(|_| Err(error(io::ErrorKind::Other, "first")));
    assert_same_error(&decorated.accept().unwrap_err(), io::ErrorKind::Other, "first");

    decorated.set_before_accept(|_| Err(error(io::ErrorKind::Other, "second")));
    assert_same_error(&decorated.accept().unwrap_err(), io::ErrorKind::Other, "second");

    decorated.before_accept = None;
    assert!(decorated.accept().is_ok());
    assert_eq!(calls(&log), ["accept"]);
}

fn accept_through<L: Listener>(listener: &mut L) -> io::Result<L::Conn> {
    listener.accept()
}

#[test]
fn decorators_nest_and_substitute() {
    let log = new_log();
    let mut inner = ListenerDecorator::new(MockListener::new(&log));
    let (l1, l2) = (log.clone(), log.clone());
    inner
        .set_before_accept(move |_| {
            push(&l1, "inner_before");
            Ok(())
        })
        .set_after_accept(move |_, _| push(&l2, "inner_after"));

    let mut outer = ListenerDecorator::new(inner);
    let (l3, l4) = (log.clone(), log.clone());
    outer
        .set_before_accept(move |_| {
            push(&l3, "outer_before");
            Ok(())
        })
        .set_after_accept(move |_, _| push(&l4, "outer_after"));

    let conn = accept_through(&mut outer).unwrap();
    assert_eq!(
        calls(&log),
        ["outer_before", "inner_before", "accept", "inner_after", "outer_after"]
    );
    assert_eq!(conn.inner().inner().local_addr(), Some(common::local_addr()));
}
