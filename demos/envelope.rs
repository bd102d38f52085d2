//! Sweeps a small outrunner with and without flux weakening and writes every
//! envelope point as a CBOR message into `envelope.mcap`.
//!
//! Run with `RUST_LOG=debug` to see where the base speed lands.

use std::{collections::BTreeMap, fs::File, io::BufWriter, sync::Arc};

use pmsm_envelope::{
    compute_curve, estimate_max_speed, ControlStrategy, MotorParameters, MotorType, Region,
};
use serde::Serialize;

#[derive(Serialize)]
struct Values {
    speed_rpm: f64,
    torque_nm: f64,
    power_kw: f64,
    voltage_utilization: f64,
    current_angle_deg: f64,
    id: f64,
    iq: f64,
    region: &'static str,
}

fn region_name(region: Region) -> &'static str {
    match region {
        Region::ConstantTorque => "constant_torque",
        Region::FluxWeakening => "flux_weakening",
        Region::VoltageLimited => "voltage_limited",
        Region::Collapsed => "collapsed",
    }
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();

    let base = MotorParameters {
        motor_type: MotorType::Ipmsm,
        control_strategy: ControlStrategy::Mtpa,
        flux_weakening: false,
        rs: 0.0595,
        ld: 23.5e-6,
        lq: 35e-6,
        flux_linkage: 1.59e-3,
        pole_pairs: 15,
        dc_bus_voltage: 18.5,
        voltage_utilization: 0.9,
        max_current: 13.,
        sweep_max_rpm: 0.,
    };

    let mut writer = mcap::Writer::new(BufWriter::new(File::create("envelope.mcap")?))?;

    for flux_weakening in [false, true] {
        let mut params = MotorParameters {
            flux_weakening,
            ..base.clone()
        };
        params.validate()?;
        params.sweep_max_rpm = estimate_max_speed(&params);
        log::info!(
            "flux weakening {}: sweeping to {} rpm",
            flux_weakening,
            params.sweep_max_rpm
        );

        let topic = if flux_weakening {
            "envelope/flux_weakening"
        } else {
            "envelope/plain"
        };
        let channel = mcap::Channel {
            topic: String::from(topic),
            schema: Some(Arc::new(mcap::Schema {
                name: "".to_owned(),
                encoding: "".to_owned(),
                data: std::borrow::Cow::default(),
            })),
            message_encoding: "cbor".to_owned(),
            metadata: BTreeMap::default(),
        };
        let channel_id = writer.add_channel(&channel)?;

        let result = compute_curve(&params);
        for (sequence, point) in result.points.iter().enumerate() {
            let mut buffer = Vec::with_capacity(128);
            ciborium::into_writer(
                &Values {
                    speed_rpm: point.speed_rpm,
                    torque_nm: point.torque_nm,
                    power_kw: point.power_kw,
                    voltage_utilization: point.voltage_utilization,
                    current_angle_deg: point.current_angle_deg,
                    id: point.id,
                    iq: point.iq,
                    region: region_name(point.region),
                },
                &mut buffer,
            )?;
            // Speed stands in for time so the plot x-axis is RPM
            let log_time = point.speed_rpm as u64 * 1_000_000;
            writer.write_to_known_channel(
                &mcap::records::MessageHeader {
                    channel_id,
                    sequence: sequence as u32,
                    log_time,
                    publish_time: log_time,
                },
                &buffer,
            )?;
        }

        println!(
            "flux weakening {:5}: max torque {:.3} Nm, base speed {} rpm, max power {:.3} kW, {} points",
            flux_weakening,
            result.max_torque_nm,
            result.base_speed_rpm,
            result.max_power_kw,
            result.points.len()
        );
    }

    writer.finish()?;

    Ok(())
}
