use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};

use orientation_engine_rs::{
    AccelSample, EngineConfig, HeadingSample, LocationFix, MagAccuracy, MagSample, NullObserver,
    OrientationService, OrientationState, RegistrationError, SensorAvailability, SensorEvent,
    SensorRegistry,
};

#[derive(Parser, Debug)]
#[command(name = "compass_engine")]
#[command(about = "Orientation fusion engine demo against mock sensor streams", long_about = None)]
struct Args {
    /// Duration in seconds (0 = continuous)
    #[arg(value_name = "SECONDS", default_value = "10")]
    duration: u64,

    /// Simulated walking turn rate, degrees per second
    #[arg(long, default_value = "12.0")]
    turn_rate: f32,

    /// Fixed magnetic declination applied to the fused heading
    #[arg(long, default_value = "2.0")]
    declination: f32,

    /// Where to write the periodic JSON status snapshot
    #[arg(long, default_value = "compass_status.json")]
    status_path: String,
}

/// Mock platform: one task per registration streaming plausible accel, mag,
/// and direct-orientation samples while the device slowly turns in place.
struct MockRegistry {
    turn_rate_deg_per_sec: f32,
    stop_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl MockRegistry {
    fn new(turn_rate_deg_per_sec: f32) -> Self {
        Self { turn_rate_deg_per_sec, stop_tx: None }
    }
}

impl SensorRegistry for MockRegistry {
    fn availability(&self) -> SensorAvailability {
        SensorAvailability {
            has_orientation: true,
            has_accelerometer: true,
            has_magnetometer: true,
            has_gyroscope: true,
        }
    }

    fn register(
        &mut self,
        period_micros: u32,
        events: mpsc::Sender<SensorEvent>,
    ) -> Result<(), RegistrationError> {
        let (stop_tx, mut stop_rx) = tokio::sync::oneshot::channel();
        self.stop_tx = Some(stop_tx);
        let turn_rate = self.turn_rate_deg_per_sec;

        tokio::spawn(async move {
            let period = Duration::from_micros(u64::from(period_micros));
            let dt = period_micros as f32 * 1e-6;
            let mut heading: f32 = 0.0;
            let mut tick: u64 = 0;

            let _ = events
                .send(SensorEvent::Location(LocationFix {
                    timestamp_millis: Utc::now().timestamp_millis(),
                    latitude: 47.61,
                    longitude: -122.33,
                    altitude_meters: 56.0,
                }))
                .await;
            let _ = events.send(SensorEvent::MagAccuracy(MagAccuracy::High)).await;

            loop {
                if stop_rx.try_recv().is_ok() {
                    break;
                }
                let now_nanos = Utc::now().timestamp_millis() * 1_000_000;
                heading = (heading + turn_rate * dt).rem_euclid(360.0);
                let heading_rad = heading.to_radians();

                // Device held flat with a touch of hand tremor
                let tremor = (tick as f32 * 0.7).sin() * 0.2;
                let batch = [
                    SensorEvent::Accel(AccelSample {
                        timestamp_nanos: now_nanos,
                        x: tremor,
                        y: -tremor,
                        z: 9.81,
                    }),
                    SensorEvent::Mag(MagSample {
                        timestamp_nanos: now_nanos,
                        x: -heading_rad.sin() * 22.0,
                        y: heading_rad.cos() * 22.0,
                        z: -41.0,
                    }),
                    SensorEvent::Heading(HeadingSample {
                        timestamp_nanos: now_nanos,
                        magnetic_heading_degrees: heading + tremor,
                    }),
                ];
                for event in batch {
                    if events.send(event).await.is_err() {
                        return;
                    }
                }
                tick += 1;
                sleep(period).await;
            }
        });
        Ok(())
    }

    fn unregister(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }
}

#[derive(Serialize)]
struct StatusSnapshot {
    timestamp: String,
    uptime_seconds: u64,
    state: OrientationState,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("[{}] Compass Engine Starting", ts_now());
    println!("  Duration: {} seconds (0=continuous)", args.duration);
    println!("  Turn rate: {} deg/s", args.turn_rate);
    println!("  Declination: {} deg", args.declination);
    println!("  Status file: {}", args.status_path);

    let mut service = OrientationService::start(
        EngineConfig::default(),
        Box::new(MockRegistry::new(args.turn_rate)),
        Box::new(NullObserver),
    )?;
    service.set_declination_degrees(args.declination).await?;

    let rx = service.subscribe();
    let start = Utc::now();
    let mut last_status_save = Utc::now();

    loop {
        let now = Utc::now();
        let uptime = now.signed_duration_since(start).num_seconds().max(0) as u64;
        if args.duration > 0 && uptime >= args.duration {
            println!("[{}] Duration reached, stopping...", ts_now());
            break;
        }

        let state = *rx.borrow();
        match state {
            OrientationState::Initializing => {
                println!("[{}] initializing...", ts_now());
            }
            OrientationState::Available {
                true_heading_degrees,
                compass_status,
                phone_tilt_degrees,
                should_show_calibration,
                ..
            } => {
                println!(
                    "[{}] heading {:6.1} deg  status {:?}  tilt {:5.1} deg  prompt {}",
                    ts_now(),
                    true_heading_degrees,
                    compass_status,
                    phone_tilt_degrees,
                    should_show_calibration
                );
            }
        }

        if now.signed_duration_since(last_status_save).num_seconds() >= 2 {
            let snapshot = StatusSnapshot {
                timestamp: now.to_rfc3339(),
                uptime_seconds: uptime,
                state,
            };
            std::fs::write(&args.status_path, serde_json::to_string_pretty(&snapshot)?)?;
            last_status_save = now;
        }

        sleep(Duration::from_millis(1000)).await;
    }

    service.stop().await;

    let final_snapshot = StatusSnapshot {
        timestamp: Utc::now().to_rfc3339(),
        uptime_seconds: Utc::now().signed_duration_since(start).num_seconds().max(0) as u64,
        state: *rx.borrow(),
    };
    std::fs::write(&args.status_path, serde_json::to_string_pretty(&final_snapshot)?)?;
    println!("[{}] Final status written to {}", ts_now(), args.status_path);

    Ok(())
}

fn ts_now() -> String {
    Utc::now().format("%H:%M:%S").to_string()
}
