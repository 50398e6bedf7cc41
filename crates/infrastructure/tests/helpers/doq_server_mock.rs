#![allow(dead_code)]
use doq_client_domain::MessageFraming;
use hickory_proto::op::{Message, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::rdata::{A, TXT};
use hickory_proto::rr::{RData, Record};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How the mock answers each stream.
#[derive(Debug, Clone)]
pub enum ServerBehavior {
    /// Echo the question with `records` A answers.
    Answer { records: usize },
    /// Answer with a TXT padded so the encoded message is exactly `size` bytes.
    ExactSize { size: usize },
    /// Like `Answer`, but with this message ID instead of the query's.
    WithId { id: u16, records: usize },
    /// Send these bytes as the message body.
    Raw(Vec<u8>),
    /// Announce `announced` bytes, send `sent`, then finish the stream.
    Truncated { announced: u16, sent: usize },
    /// Read the query and never answer.
    Silent,
}

#[derive(Default)]
struct ServerStats {
    connections: AtomicUsize,
    streams: AtomicUsize,
    fin_after_query: AtomicUsize,
    peers: Mutex<Vec<SocketAddr>>,
    queries: Mutex<Vec<Vec<u8>>>,
}

/// In-process DoQ server on 127.0.0.1 with a self-signed `localhost` certificate.
pub struct MockDoqServer {
    addr: SocketAddr,
    cert: CertificateDer<'static>,
    cert_pem: String,
    stats: Arc<ServerStats>,
    endpoint: quinn::Endpoint,
}

impl MockDoqServer {
    pub async fn start(behavior: ServerBehavior) -> Self {
        Self::start_with_framing(behavior, MessageFraming::LengthPrefixed).await
    }

    pub async fn start_with_framing(behavior: ServerBehavior, framing: MessageFraming) -> Self {
        doq_client_infrastructure::install_crypto_provider();

        let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        let cert = CertificateDer::from(certified.cert.der().to_vec());
        let cert_pem = certified.cert.pem();
        let key = PrivateKeyDer::try_from(certified.key_pair.serialize_der()).unwrap();

        let mut server_crypto = rustls::ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(vec![cert.clone()], key)
            .unwrap();
        server_crypto.alpn_protocols = vec![b"doq".to_vec()];

        let server_config = quinn::ServerConfig::with_crypto(Arc::new(
            quinn::crypto::rustls::QuicServerConfig::try_from(server_crypto).unwrap(),
        ));

        let endpoint =
            quinn::Endpoint::server(server_config, SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
                .unwrap();
        let addr = endpoint.local_addr().unwrap();
        let stats = Arc::new(ServerStats::default());

        let accept_endpoint = endpoint.clone();
        let accept_stats = Arc::clone(&stats);
        tokio::spawn(async move {
            while let Some(incoming) = accept_endpoint.accept().await {
                let stats = Arc::clone(&accept_stats);
                let behavior = behavior.clone();
                tokio::spawn(async move {
                    let Ok(connection) = incoming.await else {
                        return;
                    };
                    stats.connections.fetch_add(1, Ordering::SeqCst);
                    stats
                        .peers
                        .lock()
                        .unwrap()
                        .push(connection.remote_address());

                    while let Ok((send, recv)) = connection.accept_bi().await {
                        stats.streams.fetch_add(1, Ordering::SeqCst);
                        let stats = Arc::clone(&stats);
                        let behavior = behavior.clone();
                        tokio::spawn(async move {
                            serve_stream(send, recv, behavior, framing, stats).await;
                        });
                    }
                });
            }
        });

        Self {
            addr,
            cert,
            cert_pem,
            stats,
            endpoint,
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn cert(&self) -> CertificateDer<'static> {
        self.cert.clone()
    }

    pub fn cert_pem(&self) -> &str {
        &self.cert_pem
    }

    pub fn connections(&self) -> usize {
        self.stats.connections.load(Ordering::SeqCst)
    }

    pub fn streams(&self) -> usize {
        self.stats.streams.load(Ordering::SeqCst)
    }

    /// Length-prefixed queries followed directly by the client's FIN.
    pub fn finished_queries(&self) -> usize {
        self.stats.fin_after_query.load(Ordering::SeqCst)
    }

    pub fn peers(&self) -> Vec<SocketAddr> {
        self.stats.peers.lock().unwrap().clone()
    }

    /// Query messages as received, without framing.
    pub fn queries(&self) -> Vec<Vec<u8>> {
        self.stats.queries.lock().unwrap().clone()
    }

    /// Polls until at least `count` queries arrived.
    pub async fn wait_for_queries(&self, count: usize) {
        for _ in 0..200 {
            if self.queries().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("mock DoQ server never saw {} queries", count);
    }
}

impl Drop for MockDoqServer {
    fn drop(&mut self) {
        self.endpoint.close(0u32.into(), b"");
    }
}

async fn serve_stream(
    mut send: quinn::SendStream,
    mut recv: quinn::RecvStream,
    behavior: ServerBehavior,
    framing: MessageFraming,
    stats: Arc<ServerStats>,
) {
    let query_bytes = match framing {
        MessageFraming::LengthPrefixed => {
            let mut len_buf = [0u8; 2];
            if recv.read_exact(&mut len_buf).await.is_err() {
                return;
            }
            let mut body = vec![0u8; u16::from_be_bytes(len_buf) as usize];
            if recv.read_exact(&mut body).await.is_err() {
                return;
            }
            if matches!(recv.read_to_end(0).await, Ok(rest) if rest.is_empty()) {
                stats.fin_after_query.fetch_add(1, Ordering::SeqCst);
            }
            body
        }
        MessageFraming::StreamDelimited => match recv.read_to_end(u16::MAX as usize).await {
            Ok(body) => body,
            Err(_) => return,
        },
    };
    stats.queries.lock().unwrap().push(query_bytes.clone());

    let body = match behavior {
        ServerBehavior::Silent => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(send);
            return;
        }
        ServerBehavior::Truncated { announced, sent } => {
            let mut frame = announced.to_be_bytes().to_vec();
            frame.extend(std::iter::repeat(0xAB).take(sent));
            let _ = send.write_all(&frame).await;
            let _ = send.finish();
            let _ = send.stopped().await;
            return;
        }
        ServerBehavior::Raw(bytes) => bytes,
        ServerBehavior::Answer { records } => {
            let Ok(query) = Message::from_vec(&query_bytes) else {
                return;
            };
            encode(&answer(&query, query.id(), records))
        }
        ServerBehavior::WithId { id, records } => {
            let Ok(query) = Message::from_vec(&query_bytes) else {
                return;
            };
            encode(&answer(&query, id, records))
        }
        ServerBehavior::ExactSize { size } => {
            let Ok(query) = Message::from_vec(&query_bytes) else {
                return;
            };
            padded_answer(&query, size)
        }
    };

    let frame = match framing {
        MessageFraming::LengthPrefixed => {
            let mut frame = (body.len() as u16).to_be_bytes().to_vec();
            frame.extend_from_slice(&body);
            frame
        }
        MessageFraming::StreamDelimited => body,
    };

    if send.write_all(&frame).await.is_err() {
        return;
    }
    let _ = send.finish();
    let _ = send.stopped().await;
}

fn answer(query: &Message, id: u16, records: usize) -> Message {
    let mut response = Message::new();
    response
        .set_id(id)
        .set_message_type(MessageType::Response)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(query.recursion_desired())
        .set_recursion_available(true)
        .set_response_code(ResponseCode::NoError);

    for question in query.queries() {
        response.add_query(question.clone());
    }

    if let Some(question) = query.queries().first() {
        for i in 0..records {
            let ip = Ipv4Addr::new(192, 0, 2, (i % 250) as u8 + 1);
            response.add_answer(Record::from_rdata(
                question.name().clone(),
                300,
                RData::A(A(ip)),
            ));
        }
    }

    response
}

/// Grows one TXT answer byte by byte until the encoded response is `size` long.
fn padded_answer(query: &Message, size: usize) -> Vec<u8> {
    let Some(question) = query.queries().first() else {
        return Vec::new();
    };

    let build = |strings: &[String]| {
        let mut response = answer(query, query.id(), 0);
        response.add_answer(Record::from_rdata(
            question.name().clone(),
            300,
            RData::TXT(TXT::new(strings.to_vec())),
        ));
        encode(&response)
    };

    let mut strings = vec![String::new()];
    let base = build(&strings).len();
    assert!(base <= size, "minimal padded answer is already {} bytes", base);

    // Each added character, and each new empty string, costs exactly one byte.
    let mut deficit = size - base;
    while deficit > 0 {
        let Some(last) = strings.last_mut() else {
            break;
        };
        if last.len() < 255 {
            let add = deficit.min(255 - last.len());
            last.push_str(&"x".repeat(add));
            deficit -= add;
        } else {
            strings.push(String::new());
            deficit -= 1;
        }
    }

    let bytes = build(&strings);
    assert_eq!(bytes.len(), size);
    bytes
}

fn encode(message: &Message) -> Vec<u8> {
    let mut buf = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut buf);
    message.emit(&mut encoder).unwrap();
    buf
}
