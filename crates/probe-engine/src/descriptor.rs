//! Element descriptors: what a caller asks for.
//!
//! A descriptor names one meteorological variable by its semantic element
//! code plus GRIB2-style identification fields. Populated fields must match
//! a message's metadata exactly; unpopulated fields are wildcards. Two
//! descriptors with identical identification fields are the same variable
//! no matter where they sit in the caller's request list.

use grid_source::MessageMeta;
use probe_common::{Element, ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};

/// Tolerance for comparing threshold and surface values.
const FIELD_EPS: f64 = 1e-6;

/// One requested variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDescriptor {
    /// Semantic element code.
    pub element: Element,

    // Identification fields; `None` is a wildcard.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_center: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gen_process: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface_type: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_surface_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prob_type: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast_duration_hours: Option<u32>,
}

/// Built-in element identification table: the product category and number
/// a plain element request expands to. Everything else stays wildcarded.
fn default_product(element: Element) -> (u8, u8) {
    match element {
        Element::MaxTemp => (0, 4),
        Element::MinTemp => (0, 5),
        Element::Pop12 => (1, 192),
        Element::Temp => (0, 0),
        Element::DewPoint => (0, 6),
        Element::WindDir => (2, 0),
        Element::WindSpeed => (2, 1),
        Element::WindGust => (2, 22),
        Element::Sky => (6, 1),
        Element::Qpf => (1, 8),
        Element::SnowAmount => (1, 29),
        Element::Weather => (1, 226),
        Element::ApparentTemp => (0, 21),
        Element::RelativeHumidity => (1, 1),
        Element::WaveHeight => (10, 3),
        Element::IceAccum => (1, 227),
    }
}

impl ElementDescriptor {
    /// A descriptor carrying the element's built-in product identification,
    /// all other fields wildcarded.
    pub fn new(element: Element) -> Self {
        let (category, sub_category) = default_product(element);
        Self {
            category: Some(category),
            sub_category: Some(sub_category),
            ..Self::wildcard(element)
        }
    }

    /// A descriptor with every identification field wildcarded: it matches
    /// any message of the element's textual/numeric kind.
    pub fn wildcard(element: Element) -> Self {
        Self {
            element,
            center: None,
            sub_center: None,
            gen_process: None,
            template: None,
            category: None,
            sub_category: None,
            surface_type: None,
            surface_value: None,
            second_surface_value: None,
            prob_type: None,
            lower_threshold: None,
            upper_threshold: None,
            forecast_duration_hours: None,
        }
    }

    /// Constrain the product category and number.
    pub fn with_product(mut self, category: u8, sub_category: u8) -> Self {
        self.category = Some(category);
        self.sub_category = Some(sub_category);
        self
    }

    /// Constrain the fixed surface.
    pub fn with_surface(mut self, surface_type: u8, value: f64) -> Self {
        self.surface_type = Some(surface_type);
        self.surface_value = Some(value);
        self
    }

    /// Constrain to a layer between two surface values.
    pub fn with_layer(mut self, surface_type: u8, first: f64, second: f64) -> Self {
        self.surface_type = Some(surface_type);
        self.surface_value = Some(first);
        self.second_surface_value = Some(second);
        self
    }

    /// Constrain probability type and thresholds.
    pub fn with_probability(mut self, prob_type: u8, lower: f64, upper: f64) -> Self {
        self.prob_type = Some(prob_type);
        self.lower_threshold = Some(lower);
        self.upper_threshold = Some(upper);
        self
    }

    /// Constrain the forecast period length.
    pub fn with_duration(mut self, hours: u32) -> Self {
        self.forecast_duration_hours = Some(hours);
        self
    }

    /// Reject structurally impossible descriptors. Runs before any grid
    /// source is opened.
    pub fn validate(&self) -> ProbeResult<()> {
        if let (Some(lower), Some(upper)) = (self.lower_threshold, self.upper_threshold) {
            if lower > upper {
                return Err(ProbeError::invalid_descriptor(format!(
                    "{}: probability thresholds inverted ({} > {})",
                    self.element, lower, upper
                )));
            }
        }
        if self.second_surface_value.is_some() && self.surface_value.is_none() {
            return Err(ProbeError::invalid_descriptor(format!(
                "{}: layer second surface without a first surface value",
                self.element
            )));
        }
        Ok(())
    }

    /// Whether a message's identification metadata satisfies this
    /// descriptor. Every populated field must match exactly; the message's
    /// textual/numeric kind must agree with the element's.
    pub fn matches(&self, meta: &MessageMeta) -> bool {
        if meta.textual != self.element.is_textual() {
            return false;
        }
        fn eq_opt<T: PartialEq>(want: &Option<T>, got: &T) -> bool {
            want.as_ref().map_or(true, |w| w == got)
        }
        fn eq_opt_f64(want: Option<f64>, got: f64) -> bool {
            want.map_or(true, |w| (w - got).abs() < FIELD_EPS)
        }

        if !eq_opt(&self.center, &meta.center)
            || !eq_opt(&self.sub_center, &meta.sub_center)
            || !eq_opt(&self.gen_process, &meta.gen_process)
            || !eq_opt(&self.template, &meta.template)
            || !eq_opt(&self.category, &meta.category)
            || !eq_opt(&self.sub_category, &meta.sub_category)
            || !eq_opt(&self.forecast_duration_hours, &meta.forecast_duration_hours)
        {
            return false;
        }

        if !eq_opt(&self.surface_type, &meta.surface.surface_type)
            || !eq_opt_f64(self.surface_value, meta.surface.value)
        {
            return false;
        }
        if let Some(second) = self.second_surface_value {
            match meta.surface.second_value {
                Some(got) if (second - got).abs() < FIELD_EPS => {}
                _ => return false,
            }
        }

        if self.prob_type.is_some()
            || self.lower_threshold.is_some()
            || self.upper_threshold.is_some()
        {
            let Some(prob) = &meta.probability else {
                return false;
            };
            if !eq_opt(&self.prob_type, &prob.prob_type)
                || !eq_opt_f64(self.lower_threshold, prob.lower)
                || !eq_opt_f64(self.upper_threshold, prob.upper)
            {
                return false;
            }
        }

        true
    }

    /// Whether two descriptors identify the same variable.
    pub fn same_identification(&self, other: &Self) -> bool {
        self == other
    }
}

/// Validate a request list and drop descriptors that repeat an earlier
/// identification. Order of first occurrence is preserved, which makes the
/// matcher's first-wins behavior deterministic.
pub fn dedup_descriptors(
    descriptors: Vec<ElementDescriptor>,
) -> ProbeResult<Vec<ElementDescriptor>> {
    if descriptors.is_empty() {
        return Err(ProbeError::NoDescriptors);
    }
    let mut unique: Vec<ElementDescriptor> = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        descriptor.validate()?;
        if !unique.iter().any(|d| d.same_identification(&descriptor)) {
            unique.push(descriptor);
        }
    }
    Ok(unique)
}
