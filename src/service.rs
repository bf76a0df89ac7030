//! Async lifecycle around the engine.
//!
//! All mutation is confined to one worker task: sensor events and commands
//! flow in over channels, snapshots flow out over a `watch` channel. Consumers
//! only ever see whole snapshots.
//!
//! Timestamps: sensor samples and the service's command clock must share an
//! epoch for the calibration debounce to measure real durations. This service
//! uses unix milliseconds for commands; registries should stamp samples from
//! the same clock.

use chrono::Utc;
use log::{error, info, warn};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::config::EngineConfig;
use crate::engine::{EngineError, OrientationEngine, OrientationObserver};
use crate::types::{
    AccelSample, DisplayRotation, GyroSample, HeadingSample, LocationFix, MagAccuracy, MagSample,
    OrientationState,
};

/// One event from the platform side, unordered across sensor types.
#[derive(Clone, Copy, Debug)]
pub enum SensorEvent {
    Accel(AccelSample),
    Gyro(GyroSample),
    Mag(MagSample),
    Heading(HeadingSample),
    MagAccuracy(MagAccuracy),
    Location(LocationFix),
    DisplayRotation(DisplayRotation),
}

#[derive(Debug)]
enum Command {
    SetCalibrationOffset(f32),
    SetDeclination(f32),
    RequestManualCalibration,
    DismissCalibration,
}

#[derive(Debug)]
pub struct RegistrationError {
    pub detail: String,
}

/// Platform-side sensor subscription. `register` starts delivery of events
/// into the supplied channel at the requested period; `unregister` stops it.
pub trait SensorRegistry: Send {
    fn availability(&self) -> crate::engine::SensorAvailability;
    fn register(
        &mut self,
        period_micros: u32,
        events: mpsc::Sender<SensorEvent>,
    ) -> Result<(), RegistrationError>;
    fn unregister(&mut self);
}

pub struct OrientationService {
    state_rx: watch::Receiver<OrientationState>,
    cmd_tx: mpsc::Sender<Command>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl OrientationService {
    /// Register sensors and spawn the consumer worker. Registration at the
    /// requested rate is retried once at a conservative fallback rate before
    /// the failure is surfaced.
    pub fn start(
        config: EngineConfig,
        mut registry: Box<dyn SensorRegistry>,
        observer: Box<dyn OrientationObserver>,
    ) -> Result<Self, EngineError> {
        let mut engine = OrientationEngine::new(config.clone(), registry.availability(), observer)?;

        let (event_tx, mut event_rx) = mpsc::channel::<SensorEvent>(256);
        if let Err(err) = registry.register(config.sensor_period_micros, event_tx.clone()) {
            warn!(
                "registration at {} us failed ({}), retrying at {} us",
                config.sensor_period_micros, err.detail, config.fallback_period_micros
            );
            registry
                .register(config.fallback_period_micros, event_tx)
                .map_err(|err| EngineError::Registration(err.detail))?;
        }

        engine.start();

        let (state_tx, state_rx) = watch::channel(OrientationState::Initializing);
        let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(32);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let worker = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    event = event_rx.recv() => match event {
                        Some(event) => {
                            if let Some(state) = dispatch(&mut engine, event) {
                                let _ = state_tx.send(state);
                            }
                        }
                        None => {
                            error!("sensor event channel closed, stopping worker");
                            break;
                        }
                    },
                    cmd = cmd_rx.recv() => if let Some(cmd) = cmd {
                        apply_command(&mut engine, cmd);
                        let _ = state_tx.send(engine.state());
                    },
                }
            }
            registry.unregister();
            engine.stop();
            info!("orientation worker shut down");
        });

        Ok(Self {
            state_rx,
            cmd_tx,
            shutdown_tx: Some(shutdown_tx),
            worker: Some(worker),
        })
    }

    /// Snapshot stream. Each receiver sees the latest state, never a partial
    /// update.
    pub fn subscribe(&self) -> watch::Receiver<OrientationState> {
        self.state_rx.clone()
    }

    pub async fn set_calibration_offset(&self, offset_degrees: f32) -> Result<(), EngineError> {
        self.send(Command::SetCalibrationOffset(offset_degrees)).await
    }

    pub async fn set_declination_degrees(&self, degrees: f32) -> Result<(), EngineError> {
        self.send(Command::SetDeclination(degrees)).await
    }

    pub async fn request_manual_calibration(&self) -> Result<(), EngineError> {
        self.send(Command::RequestManualCalibration).await
    }

    pub async fn dismiss_calibration(&self) -> Result<(), EngineError> {
        self.send(Command::DismissCalibration).await
    }

    /// Shut the worker down. When this resolves the registry is unregistered
    /// and no further state will be published.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.await;
        }
    }

    async fn send(&self, cmd: Command) -> Result<(), EngineError> {
        self.cmd_tx.send(cmd).await.map_err(|_| EngineError::NotStarted)
    }
}

fn dispatch(engine: &mut OrientationEngine, event: SensorEvent) -> Option<OrientationState> {
    match event {
        SensorEvent::Accel(sample) => engine.feed_accel(&sample),
        SensorEvent::Gyro(sample) => engine.feed_gyro(&sample),
        SensorEvent::Mag(sample) => engine.feed_mag(&sample),
        SensorEvent::Heading(sample) => engine.feed_heading(&sample),
        SensorEvent::MagAccuracy(accuracy) => {
            engine.set_mag_accuracy(accuracy, Utc::now().timestamp_millis());
            Some(engine.state())
        }
        SensorEvent::Location(fix) => {
            engine.feed_location(&fix);
            None
        }
        SensorEvent::DisplayRotation(rotation) => {
            engine.set_display_rotation(rotation);
            None
        }
    }
}

fn apply_command(engine: &mut OrientationEngine, cmd: Command) {
    let now_millis = Utc::now().timestamp_millis();
    match cmd {
        Command::SetCalibrationOffset(offset) => engine.set_calibration_offset(offset),
        Command::SetDeclination(degrees) => engine.set_declination_degrees(degrees),
        Command::RequestManualCalibration => engine.request_manual_calibration(now_millis),
        Command::DismissCalibration => engine.dismiss_calibration(now_millis),
    }
}
