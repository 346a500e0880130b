//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements    | Connects to                     |
//! |----------------|---------------|---------------------------------|
//! | `air_station`  | OutdoorSource | Station JSON endpoint over HTTP |
//! | `dht11`        | IndoorSource  | DHT11 via Linux IIO sysfs       |
//! | `hardware`     | ActuatorPort  | Vent + dehumidifier relays      |
//! | `sysfs_gpio`   | OutputPin     | `/sys/class/gpio` lines         |
//! | `config_file`  | ConfigPort    | JSON file on disk               |
//! | `log_sink`     | EventSink     | `log` facade                    |
//! | `time`         | TimePort      | `std::time::Instant` / manual   |
//! | `shutdown`     | n/a           | SIGINT / SIGTERM                |

pub mod air_station;
pub mod config_file;
pub mod dht11;
pub mod hardware;
pub mod log_sink;
pub mod shutdown;
pub mod sysfs_gpio;
pub mod time;
