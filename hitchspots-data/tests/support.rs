//! One-shot HTTP server standing in for a routing service.

use std::{
    io::{Read, Write},
    net::TcpListener,
    thread::{self, JoinHandle},
};

/// Canned response served to exactly one request.
pub struct StubServer {
    /// Base URL of the server, e.g. `http://127.0.0.1:40123`.
    pub base_url: String,
    handle: JoinHandle<String>,
}

impl StubServer {
    /// Serve `body` with `status` (e.g. `"200 OK"`) to the next connection.
    pub fn respond(status: &str, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
        let addr = listener.local_addr().expect("stub server address");
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept request");
            let request = read_head(&mut stream);
            stream
                .write_all(response.as_bytes())
                .expect("write stub response");
            let _ = stream.flush();
            request
        });
        Self {
            base_url: format!("http://{addr}"),
            handle,
        }
    }

    /// Wait for the request to be served and return its request line.
    pub fn request_line(self) -> String {
        let head = self.handle.join().expect("stub server thread");
        head.lines().next().unwrap_or_default().to_owned()
    }
}

fn read_head(stream: &mut impl Read) -> String {
    let mut head = Vec::new();
    let mut buf = [0_u8; 1024];
    while !head.windows(4).any(|window| window == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(read) => head.extend_from_slice(&buf[..read]),
        }
    }
    String::from_utf8_lossy(&head).into_owned()
}

/// Successful OSRM Trip payload for the waypoints `(1, 2)` and `(3, 4)`.
pub const OSRM_TRIP_BODY: &str = r#"{
    "code": "Ok",
    "trips": [{
        "geometry": { "type": "LineString", "coordinates": [[2.0, 1.0], [3.1, 2.2], [4.0, 3.0]] },
        "distance": 314583.2,
        "duration": 14400.5,
        "legs": []
    }],
    "waypoints": [
        { "location": [2.0, 1.0], "name": "", "waypoint_index": 0, "trips_index": 0 },
        { "location": [4.0, 3.0], "name": "", "waypoint_index": 1, "trips_index": 0 }
    ]
}"#;

/// Successful Mapbox Directions payload for the waypoints `(1, 2)` and `(3, 4)`.
pub const MAPBOX_DIRECTIONS_BODY: &str = r#"{
    "code": "Ok",
    "routes": [{
        "geometry": { "type": "LineString", "coordinates": [[2.0, 1.0], [2.9, 2.1], [4.0, 3.0]] },
        "distance": 315012.9,
        "duration": 13980.1,
        "weight": 14000.0,
        "legs": []
    }],
    "waypoints": [
        { "location": [2.0, 1.0], "name": "Start" },
        { "location": [4.0, 3.0], "name": "Finish" }
    ],
    "uuid": "stub"
}"#;
