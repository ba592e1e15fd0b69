use std::fmt;

use crate::parameters::{ComponentKey, GridParams, ParameterKind};

/// Immutable grid-side image of a definition parameter component.
///
/// An active component owns the slots `offset..offset + K::SIZE` of the flat parameter
/// vector; an inactive one has no offset and is held at its value.
pub struct ParameterComponent<K: ParameterKind> {
    key: ComponentKey,
    value: K::Value,
    offset: Option<usize>,
}

impl<K: ParameterKind> ParameterComponent<K> {
    pub(crate) fn new(value: K::Value, offset: Option<usize>) -> Self {
        ParameterComponent {
            key: ComponentKey::next(),
            value,
            offset,
        }
    }

    pub fn key(&self) -> ComponentKey {
        self.key
    }

    pub fn value(&self) -> &K::Value {
        &self.value
    }

    pub fn is_active(&self) -> bool {
        self.offset.is_some()
    }

    /// Offset in the flat parameter vector, `None` for an inactive component.
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    /// The slice of `params` owned by this component; `None` if inactive or if `params`
    /// is too short to hold it.
    pub fn parameters<'a>(&self, params: &'a [f64]) -> Option<&'a [f64]> {
        self.offset.and_then(|offset| params.get(offset..offset + K::SIZE))
    }

    /// Value stored in `params` if active, the fixed value otherwise. `params` must span
    /// the whole parameter vector.
    pub(crate) fn read_value(&self, params: &[f64]) -> K::Value {
        match self.offset {
            Some(offset) => K::read_parameters(&params[offset..offset + K::SIZE]),
            None => self.value,
        }
    }

    pub(crate) fn write_parameters(&self, params: &mut [f64]) {
        if let Some(offset) = self.offset {
            K::write_parameters(&self.value, &mut params[offset..offset + K::SIZE]);
        }
    }

    pub(crate) fn check_bounds(&self, params: &[f64], bounds: &GridParams) -> bool {
        self.offset
            .map_or(true, |offset| K::check_bounds(&params[offset..offset + K::SIZE], bounds))
    }

    pub(crate) fn clip_to_bounds(&self, params: &mut [f64], bounds: &GridParams) -> f64 {
        match self.offset {
            Some(offset) => K::clip_to_bounds(&mut params[offset..offset + K::SIZE], bounds),
            None => 0.0,
        }
    }
}

impl<K: ParameterKind> fmt::Debug for ParameterComponent<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterComponent")
            .field("kind", &K::NAME)
            .field("key", &self.key)
            .field("value", &self.value)
            .field("offset", &self.offset)
            .finish()
    }
}

#[cfg(test)]
mod grid_component_test {
    use nalgebra::Vector2;

    use super::*;
    use crate::parameters::{Ellipticity, Radius};

    #[test]
    fn test_inactive_component_ignores_buffer() {
        let fixed = ParameterComponent::<Radius>::new(-1.0, None);
        let mut params = [-5.0, -6.0];

        assert!(!fixed.is_active());
        assert!(fixed.parameters(&params).is_none());
        assert_eq!(fixed.read_value(&params), -1.0);
        assert!(fixed.check_bounds(&params, &GridParams::default()));
        assert_eq!(fixed.clip_to_bounds(&mut params, &GridParams::default()), 0.0);
        fixed.write_parameters(&mut params);
        assert_eq!(params, [-5.0, -6.0]);
    }

    #[test]
    fn test_active_component_uses_its_slice() {
        let e = ParameterComponent::<Ellipticity>::new(Vector2::new(0.3, 0.4), Some(1));
        let mut params = [9.0, 0.0, 0.0, 9.0];

        e.write_parameters(&mut params);
        assert_eq!(params, [9.0, 0.3, 0.4, 9.0]);
        assert_eq!(e.parameters(&params), Some(&params[1..3]));
        assert_eq!(e.read_value(&params), Vector2::new(0.3, 0.4));
    }

    #[test]
    fn test_short_buffer_has_no_slice() {
        let e = ParameterComponent::<Ellipticity>::new(Vector2::new(0.3, 0.4), Some(1));
        assert_eq!(e.parameters(&[0.0, 1.0]), None);
        assert_eq!(e.parameters(&[]), None);
        assert_eq!(e.parameters(&[0.0, 1.0, 2.0]), Some(&[1.0, 2.0][..]));
    }
}
