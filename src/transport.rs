//! MIDI input ports.
//!
//! Ports are chosen by a case-insensitive substring of their name; the first
//! match in enumeration order wins. Messages are decoded on midir's callback
//! thread and handed to the caller through a channel.

use crate::error::{Error, Result};

/// Index of the first name containing `identifier`, ignoring case.
///
/// An empty identifier matches the first port.
pub fn find_port<S: AsRef<str>>(identifier: &str, names: &[S]) -> Result<usize> {
    let needle = identifier.to_lowercase();
    names
        .iter()
        .position(|name| name.as_ref().to_lowercase().contains(&needle))
        .ok_or_else(|| Error::DeviceNotFound(identifier.to_string()))
}

#[cfg(feature = "midi")]
pub use self::midi::{Messages, MidiInputStream, input_port_names};

#[cfg(feature = "midi")]
mod midi {
    use super::find_port;
    use crate::error::{Error, Result};
    use crate::event::MidiMessage;
    use crate::shutdown::ShutdownSignal;
    use midir::{MidiInput, MidiInputConnection, MidiInputPort};
    use std::cell::Cell;
    use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
    use std::time::{Duration, Instant};

    const CLIENT_NAME: &str = "midiator";
    const WATCH_CLIENT_NAME: &str = "midiator-watch";

    /// How long a blocked read waits before rechecking shutdown.
    const POLL_INTERVAL: Duration = Duration::from_millis(100);

    /// How often an idle stream checks that its port still exists.
    const WATCH_INTERVAL: Duration = Duration::from_secs(1);

    fn new_input(client_name: &str) -> Result<MidiInput> {
        MidiInput::new(client_name)
            .map_err(|e| Error::Transport(format!("failed to initialise MIDI input: {e}")))
    }

    /// Ports paired with their names. Ports that vanish mid-enumeration are skipped.
    fn named_ports(input: &MidiInput) -> Vec<(MidiInputPort, String)> {
        input
            .ports()
            .into_iter()
            .filter_map(|port| {
                let name = input.port_name(&port).ok()?;
                Some((port, name))
            })
            .collect()
    }

    /// Names of every available MIDI input port.
    pub fn input_port_names() -> Result<Vec<String>> {
        let input = new_input(CLIENT_NAME)?;
        Ok(named_ports(&input)
            .into_iter()
            .map(|(_, name)| name)
            .collect())
    }

    /// An open connection to one MIDI input port.
    pub struct MidiInputStream {
        port_name: String,
        receiver: Receiver<MidiMessage>,
        watcher: Option<MidiInput>,
        disconnected: Cell<bool>,
        _connection: MidiInputConnection<()>,
    }

    impl MidiInputStream {
        /// Connect to the first port whose name contains `identifier`.
        pub fn open(identifier: &str) -> Result<Self> {
            log::info!("connecting to MIDI device \"{identifier}\"");

            let input = new_input(CLIENT_NAME)?;
            let mut ports = named_ports(&input);
            let index = {
                let names: Vec<&str> = ports.iter().map(|(_, name)| name.as_str()).collect();
                log::debug!("available MIDI inputs: {names:?}");
                find_port(identifier, &names)?
            };
            let (port, port_name) = ports.swap_remove(index);

            let (tx, receiver) = mpsc::channel();
            let connection = input
                .connect(
                    &port,
                    CLIENT_NAME,
                    move |_timestamp, bytes, _| {
                        let _ = tx.send(MidiMessage::parse(bytes));
                    },
                    (),
                )
                .map_err(|e| {
                    log::debug!("connecting to \"{port_name}\" failed: {e}");
                    Error::DeviceBusy(identifier.to_string())
                })?;

            // A second client lets us re-enumerate ports while connected.
            let watcher = match new_input(WATCH_CLIENT_NAME) {
                Ok(watcher) => Some(watcher),
                Err(e) => {
                    log::debug!("device disconnects will not be detected: {e}");
                    None
                }
            };

            log::info!("connected to \"{port_name}\"");
            Ok(Self {
                port_name,
                receiver,
                watcher,
                disconnected: Cell::new(false),
                _connection: connection,
            })
        }

        /// The full name of the connected port.
        pub fn port_name(&self) -> &str {
            &self.port_name
        }

        /// Whether a [`Messages`] iterator ended because the device went away.
        pub fn is_disconnected(&self) -> bool {
            self.disconnected.get()
        }

        /// Block on incoming messages until `shutdown` is triggered or the
        /// device disconnects.
        pub fn messages(&self, shutdown: &ShutdownSignal) -> Messages<'_> {
            Messages {
                stream: self,
                shutdown: shutdown.clone(),
                last_check: Instant::now(),
            }
        }

        fn port_present(&self) -> bool {
            match &self.watcher {
                Some(watcher) => named_ports(watcher)
                    .iter()
                    .any(|(_, name)| *name == self.port_name),
                None => true,
            }
        }

        fn mark_disconnected(&self) {
            log::warn!("MIDI device \"{}\" disconnected", self.port_name);
            self.disconnected.set(true);
        }
    }

    /// Blocking iterator over a stream's messages.
    pub struct Messages<'a> {
        stream: &'a MidiInputStream,
        shutdown: ShutdownSignal,
        last_check: Instant,
    }

    impl Iterator for Messages<'_> {
        type Item = MidiMessage;

        fn next(&mut self) -> Option<MidiMessage> {
            loop {
                if self.shutdown.is_triggered() {
                    return None;
                }

                match self.stream.receiver.recv_timeout(POLL_INTERVAL) {
                    Ok(message) => return Some(message),
                    Err(RecvTimeoutError::Disconnected) => {
                        self.stream.mark_disconnected();
                        return None;
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        if self.last_check.elapsed() < WATCH_INTERVAL {
                            continue;
                        }
                        self.last_check = Instant::now();
                        if !self.stream.port_present() {
                            self.stream.mark_disconnected();
                            return None;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PORTS: [&str; 3] = ["Midi Through:0", "CASIO USB-MIDI:0", "Casio Piano 2"];

    #[test]
    fn test_find_port_substring_ignores_case() {
        assert_eq!(find_port("casio", &PORTS).unwrap(), 1);
        assert_eq!(find_port("Piano", &PORTS).unwrap(), 2);
        assert_eq!(find_port("usb-midi", &PORTS).unwrap(), 1);
    }

    #[test]
    fn test_find_port_first_match_wins() {
        assert_eq!(find_port("Casio", &["Casio USB MIDI", "Casio"]).unwrap(), 0);
        assert_eq!(find_port("", &PORTS).unwrap(), 0);
    }

    #[test]
    fn test_find_port_not_found() {
        let err = find_port("Yamaha", &PORTS).unwrap_err();
        assert!(matches!(err, Error::DeviceNotFound(ref id) if id == "Yamaha"));
        assert_eq!(
            err.to_string(),
            "\"Yamaha\" does not identify an active or valid MIDI device"
        );

        let empty: [&str; 0] = [];
        assert!(find_port("", &empty).is_err());
    }
}
