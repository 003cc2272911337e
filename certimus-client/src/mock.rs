//! In-process mock sensor for tests.
//!
//! Serves the Certimus `/data` endpoint over plain HTTP/1.1 on an
//! ephemeral loopback port, answering every request with a fixed
//! payload. Counters expose how many requests were served and the peak
//! number in flight, so tests can assert on throttling behaviour.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use certimus_rs_core::SensorAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A fake Certimus sensor listening on `127.0.0.1:<ephemeral>`.
pub struct MockSensor {
    addr: SensorAddr,
    served: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

struct Behaviour {
    status: u16,
    payload: Vec<u8>,
    delay: Option<Duration>,
}

impl MockSensor {
    /// Start a sensor that answers 200 with a fixed miniSEED-sized body.
    pub async fn start() -> Self {
        Self::spawn(Behaviour {
            status: 200,
            payload: vec![0xAA; 1024],
            delay: None,
        })
        .await
    }

    /// Start a sensor that answers 200 with the given body.
    pub async fn start_with_payload(payload: Vec<u8>) -> Self {
        Self::spawn(Behaviour {
            status: 200,
            payload,
            delay: None,
        })
        .await
    }

    /// Start a sensor that answers every request with `status`.
    pub async fn start_with_status(status: u16) -> Self {
        Self::spawn(Behaviour {
            status,
            payload: Vec::new(),
            delay: None,
        })
        .await
    }

    /// Start a sensor that sleeps before answering, for concurrency tests.
    pub async fn start_with_delay(delay: Duration) -> Self {
        Self::spawn(Behaviour {
            status: 200,
            payload: vec![0xAA; 1024],
            delay: Some(delay),
        })
        .await
    }

    async fn spawn(behaviour: Behaviour) -> Self {
        // Binding loopback on port 0 cannot reasonably fail in tests
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock sensor");
        let port = listener.local_addr().expect("local addr").port();
        let addr = SensorAddr::parse(&format!("127.0.0.1:{port}")).expect("valid addr");

        let served = Arc::new(AtomicUsize::new(0));
        let max_in_flight = Arc::new(AtomicUsize::new(0));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let behaviour = Arc::new(behaviour);

        {
            let served = served.clone();
            let max_in_flight = max_in_flight.clone();
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    let behaviour = behaviour.clone();
                    let served = served.clone();
                    let max_in_flight = max_in_flight.clone();
                    let in_flight = in_flight.clone();
                    tokio::spawn(async move {
                        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        max_in_flight.fetch_max(now, Ordering::SeqCst);
                        served.fetch_add(1, Ordering::SeqCst);
                        let _ = serve_one(stream, &behaviour).await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                    });
                }
            });
        }

        Self {
            addr,
            served,
            max_in_flight,
        }
    }

    /// Address to register the mock under.
    pub fn addr(&self) -> SensorAddr {
        self.addr.clone()
    }

    /// Total requests answered so far.
    pub fn requests_served(&self) -> usize {
        self.served.load(Ordering::SeqCst)
    }

    /// Peak number of requests being served at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

async fn serve_one(mut stream: TcpStream, behaviour: &Behaviour) -> std::io::Result<()> {
    // Read until the end of the request headers; the body is always empty
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }

    if let Some(delay) = behaviour.delay {
        tokio::time::sleep(delay).await;
    }

    let reason = match behaviour.status {
        200 => "OK",
        404 => "Not Found",
        _ => "Error",
    };
    let header = format!(
        "HTTP/1.1 {} {reason}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        behaviour.status,
        behaviour.payload.len()
    );
    stream.write_all(header.as_bytes()).await?;
    stream.write_all(&behaviour.payload).await?;
    stream.flush().await?;
    Ok(())
}
