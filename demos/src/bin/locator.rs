//! This demo receives the angle reports of a direction-finding locator
//! over WebSocket (port 8080) and prints the azimuth and elevation
//! of each beacon it reports.
//!
//! Set the `RUST_LOG` environment variable to change the log level (default is `info`).
use std::{
    net::{TcpListener, TcpStream},
    thread,
};

use anyhow::Result;
use df_beacon_demos::{
    debug_err,
    locator::{AngleReport, LOCATOR_PORT},
};
use log::{info, warn};
use tungstenite::{accept, Error as WsError, Message};

/// Print the reports of one connected locator until it disconnects.
fn serve(client: usize, stream: TcpStream) -> Result<()> {
    let mut socket = accept(stream).map_err(debug_err)?;
    info!("New client connected: {client}");
    loop {
        match socket.read() {
            Ok(Message::Text(text)) => match text.parse::<AngleReport>() {
                Ok(report) => println!("{report}"),
                Err(e) => warn!("Client {client} sent a malformed report: {e}"),
            },
            Ok(Message::Close(_)) | Err(WsError::ConnectionClosed) => break,
            Ok(_) => {}
            Err(e) => return Err(e.into()),
        }
    }
    info!("Client disconnected: {client}");
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let server = TcpListener::bind(("0.0.0.0", LOCATOR_PORT))?;
    info!("Waiting for locators on port {LOCATOR_PORT}");
    for (client, stream) in server.incoming().enumerate() {
        let stream = stream?;
        thread::spawn(move || {
            if let Err(e) = serve(client + 1, stream) {
                warn!("Client {} dropped: {e}", client + 1);
            }
        });
    }
    Ok(())
}
