use madgwick_ahrs::{Madgwick, QuaternionExt};
use nalgebra::Vector3;

const SAMPLE_PERIOD: f32 = 0.01; // 10 ms control tick
const GAIN: f32 = 0.1;

fn main() {
    let mut ahrs = match Madgwick::new(SAMPLE_PERIOD, GAIN) {
        Ok(ahrs) => ahrs,
        Err(error) => {
            eprintln!("bad filter settings: {error}");
            return;
        }
    };

    for _ in 0..10 {
        // this loop should repeat each time new sensor data is available
        let gyroscope = Vector3::new(0.0, 0.0, 0.0); // replace this with actual gyroscope data in rad/s
        let accelerometer = Vector3::new(0.0, 0.0, 1.0); // replace this with actual accelerometer data
        let magnetometer = Vector3::new(22.0, 0.0, -41.0); // replace this with actual magnetometer data

        if let Err(error) = ahrs.update(gyroscope, accelerometer, magnetometer) {
            println!("Skipped: {error}");
            continue;
        }

        let (roll, pitch, yaw) = ahrs.quaternion().euler_angles_degrees();

        println!("Roll: {roll:.2}, Pitch: {pitch:.2}, Yaw: {yaw:.2}");
    }
}
