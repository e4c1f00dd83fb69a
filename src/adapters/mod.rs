//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements   | Connects to                      |
//! |-------------|--------------|----------------------------------|
//! | `console`   | env_logger   | stdout (host binary only)        |
//! | `gpio`      | OutputPort   | `embedded-hal` output pin banks  |
//! | `log_sink`  | EventSink    | `log` facade                     |
//! | `sim`       | AnalogPort   | scripted photoresistor readings  |
//! |             | OutputPort   | in-memory frame recorder         |

pub mod console;
pub mod gpio;
pub mod log_sink;
pub mod sim;
