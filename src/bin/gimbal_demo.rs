use std::{
    env,
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use cymbal::{
    config::SystemConfig,
    module::{gimbal::Gimbal, sensor::mpu6050::Mpu6050, spotlight::Spotlight},
    transport::rpi::{RpiI2c, RpiServoPwm, RpiUartConnector},
};

use crossbeam_channel::{bounded, select, tick};
use tracing::{info, trace, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const MOVES: [(f32, f32, &str); 4] = [
    (30.0, 0.0, "both looking down 30 degrees"),
    (0.0, 45.0, "both looking right 45 degrees"),
    (-20.0, -45.0, "both looking up 20 degrees, left 45 degrees"),
    (0.0, 0.0, "both back to center"),
];

pub fn main() {
    let args: Vec<String> = env::args().collect();
    let config_path = args.get(1).map(String::as_str).unwrap_or("config.json");
    let config = SystemConfig::load(config_path).expect("load config");

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .init();

    info!("config: {:?}", config);

    let mut camera = Gimbal::new(RpiUartConnector, config.camera_gimbal.serial_settings());
    if let Err(e) = camera.connect() {
        warn!("camera gimbal on {} unavailable: {}", camera.settings().port, e);
    }

    let spot_cfg = &config.spotlight_gimbal;
    let pwm = RpiServoPwm::new(&[spot_cfg.pitch_pin, spot_cfg.yaw_pin]).expect("claim servo gpio");
    let sensor = if spot_cfg.use_stabilization {
        match RpiI2c::new(spot_cfg.i2c_bus, spot_cfg.i2c_address) {
            Ok(bus) => Some(Mpu6050::new(bus)),
            Err(e) => {
                warn!("i2c bus {} unavailable, stabilization disabled: {}", spot_cfg.i2c_bus, e);
                None
            }
        }
    } else {
        None
    };
    let mut spotlight = Spotlight::new(pwm, spot_cfg.pitch_channel(), spot_cfg.yaw_channel(), sensor);
    spotlight.initialize().expect("initialize spotlight gimbal");

    let stabilizing = spotlight.stabilization_enabled();
    let spotlight = Arc::new(Mutex::new(spotlight));
    let (done_tx, done_rx) = bounded::<()>(0);

    let join = stabilizing.then(|| {
        let spotlight = spotlight.clone();
        let ticker = tick(spot_cfg.stabilize_interval());
        thread::spawn(move || loop {
            select! {
                recv(ticker) -> _ => {
                    let mut spotlight = spotlight.lock().expect("spotlight lock");
                    if let Err(e) = spotlight.stabilize() {
                        trace!("stabilize step skipped: {}", e);
                    }
                }

                recv(done_rx) -> _ => {
                    break;
                }
            }
        })
    });

    info!("centering all gimbals");
    if camera.is_connected() {
        if let Err(e) = camera.center() {
            warn!("camera center failed: {}", e);
        }
    }
    spotlight.lock().expect("spotlight lock").center().expect("center spotlight");
    thread::sleep(Duration::from_secs(2));

    if camera.is_connected() {
        info!("camera gimbal status: {:?}", camera.get_status());
    }

    for (pitch, yaw, desc) in MOVES {
        info!("{}", desc);
        if camera.is_connected() {
            if let Err(e) = camera.set_angle(pitch, 0.0, yaw) {
                warn!("camera move failed: {}", e);
            }
        }

        if let Err(e) = spotlight.lock().expect("spotlight lock").set_position(pitch, yaw) {
            warn!("spotlight move failed: {}", e);
        }

        thread::sleep(Duration::from_secs(3));
    }

    drop(done_tx);
    if let Some(join) = join {
        join.join().expect("stabilization thread join");
    }

    {
        let mut spotlight = spotlight.lock().expect("spotlight lock");
        let _ = spotlight.stop();
        let _ = spotlight.shutdown();
    }
    camera.disconnect();

    info!("all things done");
}
