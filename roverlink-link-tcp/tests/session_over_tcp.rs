use std::{
    io::{Read, Write},
    net::TcpListener,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use roverlink::prelude::*;
use roverlink_link_tcp::{TcpLink, TcpOption};

fn wait_for(mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(Instant::now() < deadline, "condition not met in time");
        std::thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn drive_and_telemetry_over_a_bridge() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;

    // the peripheral: sends one telemetry line, then records whatever
    // command frames arrive
    let frames = Arc::new(Mutex::new(Vec::new()));
    let server = std::thread::spawn({
        let frames = frames.clone();
        move || -> std::io::Result<()> {
            let (mut peer, _) = listener.accept()?;
            peer.write_all(b"42.0\n")?;
            let mut buf = [0u8; 256];
            loop {
                let n = peer.read(&mut buf)?;
                if n == 0 {
                    return Ok(());
                }
                frames.lock().unwrap().extend_from_slice(&buf[..n]);
            }
        }
    });

    let readings = Arc::new(Mutex::new(Vec::new()));
    let mut session = Session::new(
        TcpLink::new(addr, TcpOption::default()),
        {
            let readings = readings.clone();
            move |r: TelemetryReading| readings.lock().unwrap().push(r.value())
        },
        |status| eprintln!("{status}"),
        SessionOption {
            period: Duration::from_millis(5),
        },
    );

    session.connect()?;
    assert_eq!(ConnectionState::Connected, session.connection_state());

    wait_for(|| readings.lock().unwrap().as_slice() == [42]);

    let drive = session.drive_state();
    drive.set_direction(Direction::Forward, true);
    wait_for(|| {
        let bytes = frames.lock().unwrap().clone();
        String::from_utf8_lossy(&bytes).contains("m238n238")
    });

    session.close()?;
    assert_eq!(ConnectionState::Disconnected, session.connection_state());
    server.join().unwrap()?;
    Ok(())
}

#[test]
fn peer_disappearing_marks_the_session_disconnected() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    let server = std::thread::spawn(move || listener.accept());

    let mut session = Session::new(
        TcpLink::new(addr, TcpOption::default()),
        |_| {},
        |_| {},
        SessionOption::default(),
    );
    session.connect()?;

    // the bridge drops the connection
    drop(server.join().unwrap()?);

    wait_for(|| session.connection_state() == ConnectionState::Disconnected);
    session.close()?;
    Ok(())
}
