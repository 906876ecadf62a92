//! Unit conversion policy.
//!
//! Conversions are applied to numeric values as the last step of record
//! extraction. Textual values are never converted.

use probe_common::{Element, UnitSystem};

/// Convert a native-unit value into the requested unit system.
pub fn convert(element: Element, system: UnitSystem, value: f64) -> f64 {
    match system {
        UnitSystem::Native => value,
        UnitSystem::English => to_english(element, value),
        UnitSystem::Metric => to_metric(element, value),
    }
}

/// The unit label reported on records in the requested system.
pub fn unit_label(element: Element, system: UnitSystem) -> &'static str {
    use Element::*;
    match (element, system) {
        (Weather, _) => "wx",

        (MaxTemp | MinTemp | Temp | DewPoint | ApparentTemp, UnitSystem::Native) => "K",
        (MaxTemp | MinTemp | Temp | DewPoint | ApparentTemp, UnitSystem::English) => "F",
        (MaxTemp | MinTemp | Temp | DewPoint | ApparentTemp, UnitSystem::Metric) => "C",

        (WindSpeed | WindGust, UnitSystem::English) => "knots",
        (WindSpeed | WindGust, _) => "m/s",

        (WindDir, _) => "degrees true",

        (Pop12 | Sky | RelativeHumidity, _) => "%",

        (Qpf, UnitSystem::English) => "inches",
        (Qpf, _) => "kg/m^2",

        (SnowAmount | IceAccum, UnitSystem::Native) => "m",
        (SnowAmount | IceAccum, UnitSystem::English) => "inches",
        (SnowAmount | IceAccum, UnitSystem::Metric) => "cm",

        (WaveHeight, UnitSystem::English) => "feet",
        (WaveHeight, _) => "m",
    }
}

fn to_english(element: Element, value: f64) -> f64 {
    use Element::*;
    match element {
        MaxTemp | MinTemp | Temp | DewPoint | ApparentTemp => (value - 273.15) * 9.0 / 5.0 + 32.0,
        WindSpeed | WindGust => value * 1.943_844_5,
        Qpf => value / 25.4,
        SnowAmount | IceAccum => value * 39.370_1,
        WaveHeight => value * 3.280_84,
        WindDir | Pop12 | Sky | RelativeHumidity | Weather => value,
    }
}

fn to_metric(element: Element, value: f64) -> f64 {
    use Element::*;
    match element {
        MaxTemp | MinTemp | Temp | DewPoint | ApparentTemp => value - 273.15,
        SnowAmount | IceAccum => value * 100.0,
        _ => value,
    }
}
