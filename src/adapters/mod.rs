//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements         | Connects to                 |
//! |-------------|--------------------|-----------------------------|
//! | `hardware`  | SensorPort         | DHT22, ADC1                 |
//! |             | DisplayPort        | LCD1602 over I2C            |
//! | `log_sink`  | EventSink          | Serial log output           |
//! | `network`   | ConnectivityPort   | `wifi` + `mqtt` below       |
//! |             | PublishPort        |                             |
//! | `rng`       | RandomPort         | ESP32 hardware RNG          |
//! | `time`      | ClockPort          | ESP32 system timer          |

pub mod hardware;
pub mod log_sink;
pub mod mqtt;
pub mod network;
pub mod rng;
pub mod time;
pub mod wifi;
