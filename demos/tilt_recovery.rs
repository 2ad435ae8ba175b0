//! Tilt recovery demonstration
//!
//! Starts the filter at identity while the airframe actually sits banked,
//! pitched and yawed, then watches the estimate converge. Synthetic sensor
//! readings are generated from the true attitude, with a short accelerometer
//! dropout half way through.
//!
//! Writes `tilt_recovery.csv` and `tilt_recovery.png`.
//!
//! Run with: `RUST_LOG=debug cargo run --example tilt_recovery`

use madgwick_ahrs::{DEG_TO_RAD, Madgwick, MadgwickSettings, RAD_TO_DEG};
use nalgebra::{UnitQuaternion, Vector3};
use plotters::prelude::*;
use serde::Serialize;
use std::error::Error;

const SAMPLE_RATE: f32 = 100.0; // 100 Hz
const DURATION: f32 = 6.0; // seconds
const DROPOUT: std::ops::Range<usize> = 250..260;

#[derive(Debug, Serialize)]
struct Record {
    #[serde(rename = "Time (s)")]
    time: f32,
    #[serde(rename = "Roll (deg)")]
    roll: f32,
    #[serde(rename = "Pitch (deg)")]
    pitch: f32,
    #[serde(rename = "Yaw (deg)")]
    yaw: f32,
    #[serde(rename = "Acceleration error")]
    acceleration_error: f32,
    #[serde(rename = "Magnetic error")]
    magnetic_error: f32,
    #[serde(rename = "Skipped")]
    skipped: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let settings = MadgwickSettings {
        sample_period: 1.0 / SAMPLE_RATE,
        gain: 0.5, // fast pull-in for the demo
    };
    let mut ahrs = Madgwick::with_settings(settings)?;

    // true attitude: 30° roll, -20° pitch, 45° heading
    let truth = UnitQuaternion::from_euler_angles(
        30.0 * DEG_TO_RAD,
        -20.0 * DEG_TO_RAD,
        45.0 * DEG_TO_RAD,
    );
    // earth-frame gravity reaction and a 65° dip field, rotated into the body
    let accelerometer = truth.inverse_transform_vector(&Vector3::new(0.0, 0.0, 1.0));
    let magnetometer = truth.inverse_transform_vector(&Vector3::new(20.0, 0.0, -43.0));

    println!(
        "Recovering from identity to true attitude (30.0°, -20.0°, 45.0°) at beta {:.2}",
        settings.gain
    );

    let ticks = (DURATION * SAMPLE_RATE) as usize;
    let mut records = Vec::with_capacity(ticks);

    for i in 0..ticks {
        let accel = if DROPOUT.contains(&i) {
            Vector3::zeros()
        } else {
            accelerometer
        };

        let skipped = ahrs
            .update(Vector3::zeros(), accel, magnetometer)
            .is_err();

        let states = ahrs.internal_states();
        let record = Record {
            time: i as f32 / SAMPLE_RATE,
            roll: ahrs.roll() * RAD_TO_DEG,
            pitch: ahrs.pitch() * RAD_TO_DEG,
            yaw: ahrs.yaw() * RAD_TO_DEG,
            acceleration_error: states.acceleration_error,
            magnetic_error: states.magnetic_error,
            skipped,
        };

        if i % 100 == 0 {
            println!(
                "t={:.1}s orientation=({:.1}°,{:.1}°,{:.1}°) accel_err={:.3} mag_err={:.3}",
                record.time,
                record.roll,
                record.pitch,
                record.yaw,
                record.acceleration_error,
                record.magnetic_error
            );
        }

        records.push(record);
    }

    let mut writer = csv::Writer::from_path("tilt_recovery.csv")?;
    for record in &records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    create_plot(&records)?;

    println!(
        "✓ {} ticks, {} skipped",
        records.len(),
        ahrs.internal_states().skipped_updates
    );
    println!("✓ Samples saved to tilt_recovery.csv, plot saved to tilt_recovery.png");
    Ok(())
}

/// Plot Euler angles over time with the dropout window shaded
fn create_plot(records: &[Record]) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new("tilt_recovery.png", (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let end = records.last().map_or(DURATION, |r| r.time);

    let mut chart = ChartBuilder::on(&root)
        .caption("Tilt Recovery", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f32..end, -60f32..60f32)?;

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Degrees")
        .draw()?;

    let dropout_start = DROPOUT.start as f32 / SAMPLE_RATE;
    let dropout_end = DROPOUT.end as f32 / SAMPLE_RATE;
    chart.draw_series(std::iter::once(Rectangle::new(
        [(dropout_start, -60.0), (dropout_end, 60.0)],
        RGBColor(220, 220, 220).filled(),
    )))?;

    let series: [(&str, fn(&Record) -> f32, RGBColor); 3] = [
        ("Roll", |r| r.roll, RED),
        ("Pitch", |r| r.pitch, GREEN),
        ("Yaw", |r| r.yaw, BLUE),
    ];

    for (label, value, color) in series {
        chart
            .draw_series(LineSeries::new(
                records.iter().map(|r| (r.time, value(r))),
                &color,
            ))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
