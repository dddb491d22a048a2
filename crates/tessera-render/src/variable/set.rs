// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Frame variables and the ordered set that owns them.

use super::{Uniform, UniformValue, VariableId, VariableType};
use crate::device::UniformLocation;
use crate::error::VariableError;
use crate::shader::ProgramId;
use std::collections::HashMap;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq)]
enum Storage {
    /// The variable owns its bytes.
    Staged(Vec<u8>),
    /// The bytes live in the owning set's store.
    Linked { offset: usize },
}

/// One named, typed value exposed to a shader program.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameVariable {
    name: String,
    ty: VariableType,
    occurrences: u32,
    changed: bool,
    program: ProgramId,
    storage: Storage,
    location: Option<UniformLocation>,
}

impl FrameVariable {
    fn new(name: &str, ty: VariableType, occurrences: u32, size: usize, program: ProgramId) -> Self {
        Self {
            name: name.to_string(),
            ty,
            occurrences,
            changed: true,
            program,
            storage: Storage::Staged(vec![0; size]),
            location: None,
        }
    }

    /// The shader symbol name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type.
    pub fn variable_type(&self) -> VariableType {
        self.ty
    }

    /// Array arity, at least one.
    pub fn occurrences(&self) -> u32 {
        self.occurrences
    }

    /// Size in bytes: `occurrences * element_size`.
    pub fn size(&self) -> usize {
        self.occurrences as usize * self.ty.element_size()
    }

    /// `true` when the value changed since it was last uploaded.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// The program this variable belongs to.
    pub fn program(&self) -> ProgramId {
        self.program
    }

    /// `true` once a buffer linked the variable into its store.
    pub fn is_linked(&self) -> bool {
        matches!(self.storage, Storage::Linked { .. })
    }

    /// Byte offset inside the owning buffer, if linked.
    pub fn offset(&self) -> Option<usize> {
        match self.storage {
            Storage::Linked { offset } => Some(offset),
            Storage::Staged(_) => None,
        }
    }

    /// Byte range inside the owning buffer, if linked.
    pub fn range(&self) -> Option<Range<usize>> {
        self.offset().map(|o| o..o + self.size())
    }

    /// Uniform location resolved when the program linked.
    pub fn location(&self) -> Option<UniformLocation> {
        self.location
    }

    pub(crate) fn set_location(&mut self, location: Option<UniformLocation>) {
        self.location = location;
    }

    /// Checks that the variable can be initialised.
    ///
    /// Samplers are opaque and cannot live inside a uniform block, so they are
    /// rejected when `in_buffer` is set.
    pub fn validate(&self, in_buffer: bool) -> Result<(), VariableError> {
        if !is_identifier(&self.name) {
            return Err(VariableError::InvalidName(self.name.clone()));
        }
        if self.occurrences == 0 {
            return Err(VariableError::ZeroOccurrences {
                name: self.name.clone(),
            });
        }
        if !self.ty.is_valid() || (in_buffer && self.ty.element == super::ElementType::Sampler) {
            return Err(VariableError::Unsupported {
                name: self.name.clone(),
                ty: self.ty,
            });
        }
        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// An insertion-ordered collection of frame variables with name lookup.
///
/// The set also owns the contiguous store linked variables point into. Staged
/// variables keep their own bytes until [`VariableSet::link`] moves them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableSet {
    variables: Vec<FrameVariable>,
    by_name: HashMap<String, VariableId>,
    store: Vec<u8>,
}

impl VariableSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a variable, or returns the existing one with the same name.
    ///
    /// An existing variable is returned as-is even when `ty` or `occurrences`
    /// differ from its declaration. A new variable must fit the 32-bit size
    /// field of a chunk.
    pub fn create(
        &mut self,
        ty: VariableType,
        name: &str,
        occurrences: u32,
        program: ProgramId,
    ) -> Result<VariableId, VariableError> {
        if let Some(id) = self.by_name.get(name) {
            return Ok(*id);
        }
        if occurrences == 0 {
            return Err(VariableError::ZeroOccurrences {
                name: name.to_string(),
            });
        }
        let size = (occurrences as usize)
            .checked_mul(ty.element_size())
            .filter(|&size| u32::try_from(size).is_ok())
            .ok_or_else(|| VariableError::TooLarge {
                name: name.to_string(),
                ty,
                occurrences,
            })?;
        let id = VariableId(self.variables.len());
        self.variables
            .push(FrameVariable::new(name, ty, occurrences, size, program));
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    /// Looks a variable up by name.
    pub fn find(&self, name: &str) -> Option<VariableId> {
        self.by_name.get(name).copied()
    }

    /// Returns a variable by handle.
    pub fn get(&self, id: VariableId) -> Option<&FrameVariable> {
        self.variables.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: VariableId) -> Option<&mut FrameVariable> {
        self.variables.get_mut(id.0)
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// `true` when the set holds no variable.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Iterates over the variables in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (VariableId, &FrameVariable)> {
        self.variables
            .iter()
            .enumerate()
            .map(|(i, v)| (VariableId(i), v))
    }

    /// The backing store of linked variables.
    pub fn store(&self) -> &[u8] {
        &self.store
    }

    /// The current value bytes of a variable, native byte order.
    pub fn bytes(&self, id: VariableId) -> Option<&[u8]> {
        let var = self.get(id)?;
        match &var.storage {
            Storage::Staged(bytes) => Some(bytes),
            Storage::Linked { offset } => self.store.get(*offset..*offset + var.size()),
        }
    }

    fn bytes_mut(&mut self, id: VariableId) -> Result<&mut [u8], VariableError> {
        let var = self
            .variables
            .get_mut(id.0)
            .ok_or(VariableError::UnknownVariable(id.0))?;
        let size = var.size();
        var.changed = true;
        match &mut var.storage {
            Storage::Staged(bytes) => Ok(bytes.as_mut_slice()),
            Storage::Linked { offset } => self
                .store
                .get_mut(*offset..*offset + size)
                .ok_or(VariableError::UnknownVariable(id.0)),
        }
    }

    /// Replaces the whole value of a variable.
    pub fn write_bytes(&mut self, id: VariableId, bytes: &[u8]) -> Result<(), VariableError> {
        let var = self.get(id).ok_or(VariableError::UnknownVariable(id.0))?;
        if bytes.len() != var.size() {
            return Err(VariableError::SizeMismatch {
                name: var.name.clone(),
                expected: var.size(),
                found: bytes.len(),
            });
        }
        self.bytes_mut(id)?.copy_from_slice(bytes);
        Ok(())
    }

    /// Returns a typed handle when `name` exists with type `T::TYPE`.
    pub fn uniform<T: UniformValue>(&self, name: &str) -> Option<Uniform<T>> {
        let id = self.find(name)?;
        match self.typed(id) {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::debug!("{e}");
                None
            }
        }
    }

    /// Converts an untyped handle, checking the declared type.
    pub fn typed<T: UniformValue>(&self, id: VariableId) -> Result<Uniform<T>, VariableError> {
        let var = self.get(id).ok_or(VariableError::UnknownVariable(id.0))?;
        if var.ty != T::TYPE {
            return Err(VariableError::TypeMismatch {
                name: var.name.clone(),
                expected: var.ty,
                found: T::TYPE,
            });
        }
        Ok(Uniform::new(id))
    }

    /// Sets the first element of a variable.
    pub fn set<T: UniformValue>(&mut self, handle: Uniform<T>, value: T) -> Result<(), VariableError> {
        self.set_at(handle, 0, value)
    }

    /// Sets element `index` of an array variable.
    pub fn set_at<T: UniformValue>(
        &mut self,
        handle: Uniform<T>,
        index: usize,
        value: T,
    ) -> Result<(), VariableError> {
        let range = self.element_range(handle.id, index)?;
        value.write_ne(&mut self.bytes_mut(handle.id)?[range]);
        Ok(())
    }

    /// Reads the first element of a variable.
    pub fn value<T: UniformValue>(&self, handle: Uniform<T>) -> Option<T> {
        self.value_at(handle, 0)
    }

    /// Reads element `index` of an array variable.
    pub fn value_at<T: UniformValue>(&self, handle: Uniform<T>, index: usize) -> Option<T> {
        let range = self.element_range(handle.id, index).ok()?;
        self.bytes(handle.id)?.get(range).map(T::read_ne)
    }

    fn element_range(&self, id: VariableId, index: usize) -> Result<Range<usize>, VariableError> {
        let var = self.get(id).ok_or(VariableError::UnknownVariable(id.0))?;
        if index >= var.occurrences as usize {
            return Err(VariableError::IndexOutOfRange {
                name: var.name.clone(),
                index,
                occurrences: var.occurrences,
            });
        }
        let size = var.ty.element_size();
        Ok(index * size..(index + 1) * size)
    }

    /// Parses a textual value such as `"1.0 0.5 0.25"` into a variable.
    pub fn set_from_str(&mut self, id: VariableId, text: &str) -> Result<(), VariableError> {
        let var = self.get(id).ok_or(VariableError::UnknownVariable(id.0))?;
        let bytes = var.ty.parse_values(&var.name, text, var.occurrences)?;
        self.write_bytes(id, &bytes)
    }

    /// Formats the current value of a variable.
    pub fn value_string(&self, id: VariableId) -> Option<String> {
        let ty = self.get(id)?.ty;
        self.bytes(id).map(|b| ty.format_values(b))
    }

    /// Links `ids` into a fresh store, at contiguous offsets in the given order.
    ///
    /// Values move from staged storage into the store. Returns the store size.
    pub(crate) fn link(&mut self, ids: &[VariableId]) -> usize {
        let total: usize = ids
            .iter()
            .filter_map(|id| self.get(*id))
            .map(FrameVariable::size)
            .sum();
        self.store = vec![0; total];

        let mut offset = 0;
        for id in ids {
            let Some(var) = self.variables.get_mut(id.0) else {
                continue;
            };
            let size = var.size();
            if let Storage::Staged(bytes) = &var.storage {
                self.store[offset..offset + size].copy_from_slice(bytes);
            }
            var.storage = Storage::Linked { offset };
            var.changed = true;
            offset += size;
        }
        total
    }

    /// Moves every linked value back into staged storage and drops the store.
    pub(crate) fn unlink_all(&mut self) {
        for var in &mut self.variables {
            if let Storage::Linked { offset } = var.storage {
                let size = var.size();
                let bytes = self
                    .store
                    .get(offset..offset + size)
                    .map(<[u8]>::to_vec)
                    .unwrap_or_else(|| vec![0; size]);
                var.storage = Storage::Staged(bytes);
            }
        }
        self.store.clear();
    }

    /// Returns the store ranges of changed linked variables, merging adjacent
    /// ones, and clears their dirty flags.
    pub(crate) fn take_dirty_ranges(&mut self) -> Vec<Range<usize>> {
        let mut ranges: Vec<Range<usize>> = Vec::new();
        for var in self.variables.iter_mut().filter(|v| v.changed) {
            let Some(range) = var.range() else {
                continue;
            };
            var.changed = false;
            match ranges.last_mut() {
                Some(last) if last.end == range.start => last.end = range.end,
                _ => ranges.push(range),
            }
        }
        ranges.sort_by_key(|r| r.start);
        ranges
    }

    /// Returns changed variables and clears their dirty flags.
    pub(crate) fn take_changed(&mut self) -> Vec<VariableId> {
        self.variables
            .iter_mut()
            .enumerate()
            .filter(|(_, v)| v.changed)
            .map(|(i, v)| {
                v.changed = false;
                VariableId(i)
            })
            .collect()
    }

    pub(crate) fn mark_all_changed(&mut self) {
        for var in &mut self.variables {
            var.changed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::math::{Vec3, Vec4};

    const PROGRAM: ProgramId = ProgramId(1);

    #[test]
    fn test_create_is_idempotent_by_name() {
        let mut set = VariableSet::new();
        let a = set.create(VariableType::VEC3F, "light", 1, PROGRAM).unwrap();
        let b = set.create(VariableType::MAT4F, "light", 7, PROGRAM).unwrap();
        assert_eq!(a, b);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(a).unwrap().variable_type(), VariableType::VEC3F);
        assert_eq!(set.get(a).unwrap().occurrences(), 1);
    }

    #[test]
    fn test_zero_occurrences_is_rejected() {
        let mut set = VariableSet::new();
        assert!(matches!(
            set.create(VariableType::FLOAT, "x", 0, PROGRAM),
            Err(VariableError::ZeroOccurrences { .. })
        ));
        assert!(set.is_empty());
    }

    #[test]
    fn test_oversized_variable_is_rejected() {
        let mut set = VariableSet::new();
        assert!(matches!(
            set.create(VariableType::MAT4F, "bones", u32::MAX, PROGRAM),
            Err(VariableError::TooLarge { occurrences: u32::MAX, .. })
        ));
        assert!(set.find("bones").is_none());
    }

    #[test]
    fn test_typed_handles_check_the_type() {
        let mut set = VariableSet::new();
        set.create(VariableType::VEC4F, "colour", 1, PROGRAM).unwrap();
        assert!(set.uniform::<Vec3>("colour").is_none());
        let h = set.uniform::<Vec4>("colour").unwrap();
        set.set(h, Vec4::new(1.0, 0.5, 0.25, 1.0)).unwrap();
        assert_eq!(set.value(h), Some(Vec4::new(1.0, 0.5, 0.25, 1.0)));
    }

    #[test]
    fn test_array_elements() {
        let mut set = VariableSet::new();
        let id = set.create(VariableType::FLOAT, "weights", 3, PROGRAM).unwrap();
        let h = set.typed::<f32>(id).unwrap();
        set.set_at(h, 2, 4.0).unwrap();
        assert_eq!(set.value_at(h, 2), Some(4.0));
        assert!(matches!(
            set.set_at(h, 3, 1.0),
            Err(VariableError::IndexOutOfRange { index: 3, .. })
        ));
        assert_eq!(set.value_string(id).unwrap(), "0 0 4");
    }

    #[test]
    fn test_link_moves_values_and_unlink_restores_them() {
        let mut set = VariableSet::new();
        let a = set.create(VariableType::FLOAT, "a", 1, PROGRAM).unwrap();
        let b = set.create(VariableType::VEC3F, "b", 2, PROGRAM).unwrap();
        set.set_from_str(b, "1 2 3 4 5 6").unwrap();

        assert_eq!(set.link(&[a, b]), 4 + 24);
        assert_eq!(set.get(a).unwrap().range(), Some(0..4));
        assert_eq!(set.get(b).unwrap().range(), Some(4..28));
        assert_eq!(set.value_string(b).unwrap(), "1 2 3 4 5 6");

        set.set(set.typed::<f32>(a).unwrap(), 9.0).unwrap();
        set.unlink_all();
        assert!(set.store().is_empty());
        assert!(!set.get(a).unwrap().is_linked());
        assert_eq!(set.value_string(a).unwrap(), "9");
    }

    #[test]
    fn test_dirty_ranges_merge_adjacent_variables() {
        let mut set = VariableSet::new();
        let ids: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|n| set.create(VariableType::FLOAT, n, 1, PROGRAM).unwrap())
            .collect();
        set.link(&ids);
        assert_eq!(set.take_dirty_ranges(), vec![0..12]);
        assert!(set.take_dirty_ranges().is_empty());

        set.set(set.typed::<f32>(ids[2]).unwrap(), 1.0).unwrap();
        assert_eq!(set.take_dirty_ranges(), vec![8..12]);
    }

    #[test]
    fn test_validation() {
        let mut set = VariableSet::new();
        let bad = set.create(VariableType::FLOAT, "2fast", 1, PROGRAM).unwrap();
        let sampler = set.create(VariableType::SAMPLER, "albedo", 1, PROGRAM).unwrap();
        assert!(matches!(
            set.get(bad).unwrap().validate(true),
            Err(VariableError::InvalidName(_))
        ));
        assert!(set.get(sampler).unwrap().validate(false).is_ok());
        assert!(matches!(
            set.get(sampler).unwrap().validate(true),
            Err(VariableError::Unsupported { .. })
        ));
    }
}
