//! Candidate physical parts for a classification.

use super::{AnalogClass, SignalClass};

/// Any class that can be mapped to likely parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnyClass {
    Digital(SignalClass),
    Analog(AnalogClass),
}

impl From<SignalClass> for AnyClass {
    fn from(c: SignalClass) -> Self {
        Self::Digital(c)
    }
}

impl From<AnalogClass> for AnyClass {
    fn from(c: AnalogClass) -> Self {
        Self::Analog(c)
    }
}

/// Parts that commonly produce `class`. Empty when nothing useful can be said.
pub fn suggestions(class: impl Into<AnyClass>) -> &'static [&'static str] {
    match class.into() {
        AnyClass::Digital(c) => match c {
            SignalClass::Button => &[
                "push button",
                "momentary switch",
                "reed switch",
                "tilt switch",
            ],
            SignalClass::DigitalSensorActiveLow => &["PIR sensor", "touch sensor", "flame sensor"],
            SignalClass::DigitalSensorActiveHigh => &[
                "sound sensor",
                "line-tracking sensor",
                "obstacle-avoidance sensor",
            ],
            SignalClass::MotionLike => &["PIR motion sensor"],
            SignalClass::PwmSignal => &["servo", "motor driver", "dimmable LED"],
            SignalClass::CommunicationLike => &["DHT11/DHT22 single-wire sensor", "UART line"],
            SignalClass::DrivenLow | SignalClass::Unknown => &[],
        },
        AnyClass::Analog(c) => match c {
            AnalogClass::Photoresistor => &["light sensor", "photoresistor"],
            AnalogClass::Potentiometer => &["rotary potentiometer", "slide potentiometer"],
            AnalogClass::Joystick => &["analog joystick axis"],
            AnalogClass::LowSignal
            | AnalogClass::UnknownAnalog
            | AnalogClass::MaxedOut
            | AnalogClass::MinimalSignal
            | AnalogClass::StableAnalog => &[],
        },
    }
}
