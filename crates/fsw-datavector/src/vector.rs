use std::collections::HashMap;

use fsw_errors::{Error, Result};

use crate::config::DvConfig;
use crate::ids::{ElementId, RegionId};
use crate::lock::{DvGuard, DvLock};
use crate::value::{DvScalar, ElementType, TypedValue};

/// The UDP datagram ceiling a region's payload must respect (invariant I4).
pub const MAX_REGION_BYTES: usize = 1024;

#[derive(Debug, Clone, Copy)]
struct ElementMeta {
    offset: usize,
    ty: ElementType,
}

#[derive(Debug, Clone)]
struct RegionMeta {
    offset: usize,
    size: usize,
}

/// The typed, regioned, lock-protected shared buffer described in
/// `spec.md` §3–§4.1.
///
/// Constructed once per process from an immutable [`DvConfig`]; never
/// resized or reshaped afterward. All scalar and region operations take the
/// internal lock for the duration of the call; schema queries
/// (`size_bytes`, `type_of`, ...) read only the immutable metadata computed
/// at construction and need no lock.
#[derive(Debug)]
pub struct DataVector {
    config: DvConfig,
    elements: HashMap<ElementId, ElementMeta>,
    regions: HashMap<RegionId, RegionMeta>,
    region_order: Vec<RegionId>,
    size_bytes: usize,
    lock: DvLock,
}

impl DataVector {
    /// Validate `config` and construct a `DataVector` whose buffer is laid
    /// out by concatenating regions in config order, and elements within a
    /// region in config order (invariant I3).
    pub fn create(config: DvConfig) -> Result<Self> {
        if config.regions.is_empty() {
            return Err(Error::EmptyConfig);
        }

        let mut elements = HashMap::new();
        let mut regions = HashMap::new();
        let mut region_order = Vec::with_capacity(config.regions.len());
        let mut seen_regions = std::collections::HashSet::new();
        let mut seen_elements = std::collections::HashSet::new();
        let mut buf = Vec::new();

        for region in &config.regions {
            if region.elements.is_empty() {
                return Err(Error::EmptyElems);
            }
            if !seen_regions.insert(region.id) {
                return Err(Error::DuplicateRegion);
            }

            let region_offset = buf.len();
            for elem in &region.elements {
                if !seen_elements.insert(elem.id) {
                    return Err(Error::DuplicateElem);
                }
                let ty = elem.initial.element_type();
                let offset = buf.len();
                buf.extend(elem.initial.to_bytes_le());
                elements.insert(elem.id, ElementMeta { offset, ty });
            }
            let region_size = buf.len() - region_offset;
            if region_size > MAX_REGION_BYTES {
                return Err(Error::RegionTooLarge);
            }
            regions.insert(region.id, RegionMeta { offset: region_offset, size: region_size });
            region_order.push(region.id);
        }

        let size_bytes = buf.len();
        Ok(Self {
            config,
            elements,
            regions,
            region_order,
            size_bytes,
            lock: DvLock::new(buf),
        })
    }

    /// The immutable construction config, for schema introspection and the
    /// logger.
    pub fn config(&self) -> &DvConfig {
        &self.config
    }

    pub fn element_exists(&self, id: ElementId) -> Result<()> {
        if self.elements.contains_key(&id) { Ok(()) } else { Err(Error::InvalidElem) }
    }

    pub fn type_of(&self, id: ElementId) -> Result<ElementType> {
        self.elements.get(&id).map(|m| m.ty).ok_or(Error::InvalidElem)
    }

    pub fn region_exists(&self, id: RegionId) -> Result<()> {
        if self.regions.contains_key(&id) { Ok(()) } else { Err(Error::InvalidRegion) }
    }

    /// Total buffer size, in bytes (schema-only, no lock taken).
    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    /// A region's payload size, in bytes (schema-only, no lock taken).
    pub fn region_size_bytes(&self, region: RegionId) -> Result<usize> {
        self.regions.get(&region).map(|m| m.size).ok_or(Error::InvalidRegion)
    }

    /// Take the lock directly, for callers (the network TX path) that need
    /// to hold it across more than one operation. See [`DvGuard`].
    pub fn lock(&self) -> Result<DvGuard<'_>> {
        self.lock.lock()
    }

    pub fn read<T: DvScalar>(&self, id: ElementId) -> Result<T> {
        let meta = *self.elements.get(&id).ok_or(Error::InvalidElem)?;
        if meta.ty != T::ELEMENT_TYPE {
            return Err(Error::IncorrectType);
        }
        let guard = self.lock.lock()?;
        let bytes = &guard[meta.offset..meta.offset + meta.ty.width()];
        let typed = TypedValue::from_bytes_le(meta.ty, bytes);
        drop(guard);
        T::from_typed(typed)
    }

    pub fn write<T: DvScalar>(&self, id: ElementId, value: T) -> Result<()> {
        let meta = *self.elements.get(&id).ok_or(Error::InvalidElem)?;
        if meta.ty != T::ELEMENT_TYPE {
            return Err(Error::IncorrectType);
        }
        let mut guard = self.lock.lock()?;
        let bytes = value.into_typed().to_bytes_le();
        guard[meta.offset..meta.offset + meta.ty.width()].copy_from_slice(&bytes);
        Ok(())
    }

    /// Write a pre-typed value, narrowing by the command-handler cast rule
    /// when `value`'s type doesn't already match the element's declared
    /// type. Used by the Command Handler's `Write` request path.
    pub fn write_typed_narrowed(&self, id: ElementId, raw: u64) -> Result<()> {
        let meta = *self.elements.get(&id).ok_or(Error::InvalidElem)?;
        let typed = TypedValue::narrow_from_u64(meta.ty, raw);
        let mut guard = self.lock.lock()?;
        let bytes = typed.to_bytes_le();
        guard[meta.offset..meta.offset + meta.ty.width()].copy_from_slice(&bytes);
        Ok(())
    }

    /// Write an already-typed value, requiring an exact type match
    /// (used by Actions and Transitions, which carry a `TypedValue`).
    pub fn write_typed(&self, id: ElementId, value: TypedValue) -> Result<()> {
        let meta = *self.elements.get(&id).ok_or(Error::InvalidElem)?;
        if meta.ty != value.element_type() {
            return Err(Error::IncorrectType);
        }
        let mut guard = self.lock.lock()?;
        let bytes = value.to_bytes_le();
        guard[meta.offset..meta.offset + meta.ty.width()].copy_from_slice(&bytes);
        Ok(())
    }

    /// Read an already-typed value out, for Transition guard comparisons.
    pub fn read_typed(&self, id: ElementId, expected: ElementType) -> Result<TypedValue> {
        let meta = *self.elements.get(&id).ok_or(Error::InvalidElem)?;
        if meta.ty != expected {
            return Err(Error::IncorrectType);
        }
        let guard = self.lock.lock()?;
        let bytes = &guard[meta.offset..meta.offset + meta.ty.width()];
        Ok(TypedValue::from_bytes_le(meta.ty, bytes))
    }

    /// Saturating increment. Defined only for integer elements; Bool/F32/F64
    /// return `InvalidType`. No mutation occurs when already at the type's
    /// maximum — `AlreadyMax` is returned instead.
    pub fn increment(&self, id: ElementId) -> Result<()> {
        let meta = *self.elements.get(&id).ok_or(Error::InvalidElem)?;
        if !meta.ty.is_integer() {
            return Err(Error::InvalidType);
        }
        let mut guard = self.lock.lock()?;
        let bytes = &guard[meta.offset..meta.offset + meta.ty.width()];
        let current = TypedValue::from_bytes_le(meta.ty, bytes);
        let next = current.increment()?;
        let next_bytes = next.to_bytes_le();
        guard[meta.offset..meta.offset + meta.ty.width()].copy_from_slice(&next_bytes);
        Ok(())
    }

    pub fn read_region(&self, region: RegionId, out: &mut [u8]) -> Result<()> {
        let meta = self.regions.get(&region).ok_or(Error::InvalidRegion)?.clone();
        if out.len() != meta.size {
            return Err(Error::IncorrectSize);
        }
        let guard = self.lock.lock()?;
        out.copy_from_slice(&guard[meta.offset..meta.offset + meta.size]);
        Ok(())
    }

    pub fn write_region(&self, region: RegionId, input: &[u8]) -> Result<()> {
        let meta = self.regions.get(&region).ok_or(Error::InvalidRegion)?.clone();
        if input.len() != meta.size {
            return Err(Error::IncorrectSize);
        }
        let mut guard = self.lock.lock()?;
        guard[meta.offset..meta.offset + meta.size].copy_from_slice(input);
        Ok(())
    }

    pub fn read_all(&self, out: &mut [u8]) -> Result<()> {
        if out.len() != self.size_bytes {
            return Err(Error::IncorrectSize);
        }
        let guard = self.lock.lock()?;
        out.copy_from_slice(&guard);
        Ok(())
    }

    pub fn write_all(&self, input: &[u8]) -> Result<()> {
        if input.len() != self.size_bytes {
            return Err(Error::IncorrectSize);
        }
        let mut guard = self.lock.lock()?;
        guard.copy_from_slice(input);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ElementConfig, RegionConfig};

    fn smoke_config() -> DvConfig {
        DvConfig::new(vec![RegionConfig::new(
            RegionId(0),
            vec![
                ElementConfig::new(ElementId(0), TypedValue::U8(0)),
                ElementConfig::new(ElementId(1), TypedValue::U16(10)),
                ElementConfig::new(ElementId(2), TypedValue::F32(1.5)),
            ],
        )])
    }

    #[test]
    fn scenario_s1_smoke() {
        let dv = DataVector::create(smoke_config()).unwrap();
        assert_eq!(dv.size_bytes(), 7);
        assert_eq!(dv.read::<u16>(ElementId(1)).unwrap(), 10);
        dv.write::<f32>(ElementId(2), 2.5).unwrap();
        assert_eq!(dv.read::<f32>(ElementId(2)).unwrap(), 2.5);
        assert_eq!(dv.write::<u8>(ElementId(1), 1).unwrap_err(), Error::IncorrectType);
    }

    #[test]
    fn rejects_empty_config() {
        assert_eq!(DataVector::create(DvConfig::new(vec![])).unwrap_err(), Error::EmptyConfig);
    }

    #[test]
    fn rejects_empty_region() {
        let cfg = DvConfig::new(vec![RegionConfig::new(RegionId(0), vec![])]);
        assert_eq!(DataVector::create(cfg).unwrap_err(), Error::EmptyElems);
    }

    #[test]
    fn rejects_duplicate_region_and_element_ids() {
        let dup_region = DvConfig::new(vec![
            RegionConfig::new(RegionId(0), vec![ElementConfig::new(ElementId(0), TypedValue::U8(0))]),
            RegionConfig::new(RegionId(0), vec![ElementConfig::new(ElementId(1), TypedValue::U8(0))]),
        ]);
        assert_eq!(DataVector::create(dup_region).unwrap_err(), Error::DuplicateRegion);

        let dup_elem = DvConfig::new(vec![
            RegionConfig::new(RegionId(0), vec![ElementConfig::new(ElementId(0), TypedValue::U8(0))]),
            RegionConfig::new(RegionId(1), vec![ElementConfig::new(ElementId(0), TypedValue::U8(0))]),
        ]);
        assert_eq!(DataVector::create(dup_elem).unwrap_err(), Error::DuplicateElem);
    }

    #[test]
    fn rejects_oversized_region() {
        let elements = (0..300)
            .map(|i| ElementConfig::new(ElementId(i), TypedValue::U32(0)))
            .collect();
        let cfg = DvConfig::new(vec![RegionConfig::new(RegionId(0), elements)]);
        assert_eq!(DataVector::create(cfg).unwrap_err(), Error::RegionTooLarge);
    }

    #[test]
    fn increment_saturates() {
        let cfg = DvConfig::new(vec![RegionConfig::new(
            RegionId(0),
            vec![ElementConfig::new(ElementId(0), TypedValue::U8(254))],
        )]);
        let dv = DataVector::create(cfg).unwrap();
        dv.increment(ElementId(0)).unwrap();
        assert_eq!(dv.read::<u8>(ElementId(0)).unwrap(), 255);
        assert_eq!(dv.increment(ElementId(0)).unwrap_err(), Error::AlreadyMax);
        assert_eq!(dv.read::<u8>(ElementId(0)).unwrap(), 255);
    }

    #[test]
    fn region_round_trip() {
        let dv = DataVector::create(smoke_config()).unwrap();
        let mut a = vec![0u8; 7];
        dv.read_region(RegionId(0), &mut a).unwrap();
        dv.write_region(RegionId(0), &a).unwrap();
        let mut b = vec![0u8; 7];
        dv.read_region(RegionId(0), &mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn region_write_requires_exact_size() {
        let dv = DataVector::create(smoke_config()).unwrap();
        let buf = vec![0u8; 3];
        assert_eq!(dv.write_region(RegionId(0), &buf).unwrap_err(), Error::IncorrectSize);
    }

    #[test]
    fn write_typed_narrowed_truncates() {
        let cfg = DvConfig::new(vec![RegionConfig::new(
            RegionId(0),
            vec![ElementConfig::new(ElementId(0), TypedValue::U8(0))],
        )]);
        let dv = DataVector::create(cfg).unwrap();
        dv.write_typed_narrowed(ElementId(0), 255).unwrap();
        assert_eq!(dv.read::<u8>(ElementId(0)).unwrap(), 255);
        dv.write_typed_narrowed(ElementId(0), 0x1FF).unwrap();
        assert_eq!(dv.read::<u8>(ElementId(0)).unwrap(), 0xFF);
    }
}
