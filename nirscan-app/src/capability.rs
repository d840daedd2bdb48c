//! Capability selection
//!
//! Every hardware or model collaborator comes in a Live and a Simulated
//! flavour. The choice is made once here, from `DeviceConfig::backend`;
//! nothing downstream checks for hardware.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use nirscan_core::config::{Backend, ConfigError, DeviceConfig};
use nirscan_core::input::{ButtonEvent, ButtonMap};
use nirscan_core::traits::{AdcReader, InferenceEngine, InferenceError, SensorError};
use nirscan_display::{DisplayBackend, DisplayError, FramebufferDisplay, HeadlessDisplay};
use nirscan_drivers::model::SimulatedEngine;
use nirscan_drivers::sensor::{Ads1115, Ads1115Config};
use tracing::{debug, info, warn};

use crate::config::LoadError;
use crate::scan::{Acquisition, ProcessAcquisition, SimulatedAcquisition};

/// Startup failures; each one terminates the process
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error("cannot open I2C bus {bus}: {reason}")]
    Bus { bus: String, reason: String },
    #[error(transparent)]
    Display(#[from] DisplayError),
    #[error(transparent)]
    Model(#[from] InferenceError),
    #[error(transparent)]
    Classes(#[from] ConfigError),
    #[error("cannot start thread: {0}")]
    Thread(#[source] io::Error),
}

/// Collaborators for one run
pub struct Devices {
    pub adc: Box<dyn AdcReader + Send>,
    pub display: Box<dyn DisplayBackend>,
    pub acquisition: Box<dyn Acquisition>,
    pub engine: Arc<dyn InferenceEngine>,
}

/// Open every collaborator for the configured backend
pub fn open(config: &DeviceConfig) -> Result<Devices, StartupError> {
    let classes = config.model.class_set()?;
    let devices = match config.backend {
        Backend::Live => open_live(config)?,
        Backend::Simulated => open_simulated(config, classes.len())?,
    };

    let outputs = devices.engine.output_len();
    if outputs != classes.len() {
        return Err(StartupError::Model(InferenceError::Shape(format!(
            "model has {} outputs but {} classes are configured",
            outputs,
            classes.len()
        ))));
    }
    info!(
        "Model input {}, classes {:?}",
        devices.engine.input_shape(),
        classes.iter().collect::<Vec<_>>()
    );
    Ok(devices)
}

fn open_live(config: &DeviceConfig) -> Result<Devices, StartupError> {
    let input = &config.input;
    let i2c = linux_embedded_hal::I2cdev::new(&input.i2c_bus).map_err(|e| StartupError::Bus {
        bus: input.i2c_bus.clone(),
        reason: e.to_string(),
    })?;
    let adc = Ads1115::new(
        i2c,
        linux_embedded_hal::Delay,
        Ads1115Config {
            address: input.address,
            settle_ms: input.settle_ms,
            ..Ads1115Config::default()
        },
    );
    info!("ADS1115 at 0x{:02x} on {}", input.address, input.i2c_bus);

    let d = &config.display;
    let display = FramebufferDisplay::open(&d.device, d.width, d.height, d.bits_per_pixel)?;

    let scan = &config.scan;
    let acquisition = ProcessAcquisition::new(scan.program.clone(), scan.args.clone());

    Ok(Devices {
        adc: Box::new(adc),
        display: Box::new(display),
        acquisition: Box::new(acquisition),
        engine: load_model(&config.model.path)?,
    })
}

#[cfg(feature = "tflite")]
fn load_model(path: &str) -> Result<Arc<dyn InferenceEngine>, StartupError> {
    let engine = nirscan_drivers::model::TfliteEngine::load(path)?;
    info!("Model loaded from {}", path);
    Ok(Arc::new(engine))
}

#[cfg(not(feature = "tflite"))]
fn load_model(path: &str) -> Result<Arc<dyn InferenceEngine>, StartupError> {
    Err(StartupError::Model(InferenceError::Load(format!(
        "{}: built without the tflite feature",
        path
    ))))
}

fn open_simulated(config: &DeviceConfig, classes: usize) -> Result<Devices, StartupError> {
    info!("Simulated backend: keys e/u/d/r + Enter press ENTER/UP/DOWN/RIGHT");
    let adc = KeyboardAdc::spawn(config.input.buttons)?;
    let scan = &config.scan;
    Ok(Devices {
        adc: Box::new(adc),
        display: Box::new(HeadlessDisplay::new()),
        acquisition: Box::new(SimulatedAcquisition::new(
            PathBuf::from(&scan.artifact_dir),
            scan.artifact_extension.clone(),
            classes,
        )),
        engine: Arc::new(SimulatedEngine::new(classes)),
    })
}

/// Ladder voltage with no button pressed
pub const RELEASED_MV: f32 = 3300.0;

/// Button ladder driven from stdin
///
/// Each recognised key yields the ladder voltage of its button for one
/// sample, followed by at least one released sample, so repeated keys
/// produce separate presses.
pub struct KeyboardAdc {
    presses: Receiver<f32>,
    pressed: bool,
}

impl KeyboardAdc {
    /// Start the stdin reader thread
    pub fn spawn(map: ButtonMap) -> Result<Self, StartupError> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("keyboard".into())
            .spawn(move || {
                for line in io::stdin().lock().lines() {
                    let Ok(line) = line else { break };
                    for c in line.chars() {
                        match key_button(c) {
                            Some(button) => {
                                if tx.send(map.range(button).midpoint()).is_err() {
                                    return;
                                }
                            }
                            None if c.is_whitespace() => {}
                            None => debug!("Ignoring key {:?}", c),
                        }
                    }
                }
                warn!("Keyboard input closed");
            })
            .map_err(StartupError::Thread)?;
        Ok(Self::from_receiver(rx))
    }

    pub fn from_receiver(presses: Receiver<f32>) -> Self {
        Self {
            presses,
            pressed: false,
        }
    }
}

/// Key bound to a button
pub fn key_button(c: char) -> Option<ButtonEvent> {
    match c.to_ascii_lowercase() {
        'e' => Some(ButtonEvent::Enter),
        'u' => Some(ButtonEvent::Up),
        'd' => Some(ButtonEvent::Down),
        'r' => Some(ButtonEvent::Right),
        _ => None,
    }
}

impl AdcReader for KeyboardAdc {
    fn read_millivolts(&mut self) -> Result<f32, SensorError> {
        if self.pressed {
            self.pressed = false;
            return Ok(RELEASED_MV);
        }
        match self.presses.try_recv() {
            Ok(mv) => {
                self.pressed = true;
                Ok(mv)
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => Ok(RELEASED_MV),
        }
    }
}
