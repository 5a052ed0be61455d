// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Array and matrix carriers for variant values.
//!
//! A [`VariantArray`] is a one-dimensional homogeneous array; a [`Matrix`]
//! is an N-dimensional array stored flat in row-major order next to its
//! dimension vector. Dimension validation is a pure function shared by the
//! encoders and decoders so a malformed matrix is rejected before any
//! storage is allocated: `product(dimensions)` must equal the element count
//! exactly — never silently truncated or padded.

use crate::error::{EncodingError, EncodingResult};
use crate::types::builtin::BuiltInType;
use crate::variant::Variant;

// =============================================================================
// VariantArray
// =============================================================================

/// A one-dimensional array of variant values with a declared element type.
///
/// Elements must all be null or of the declared built-in type, except when
/// the declared type is [`BuiltInType::Variant`], which admits mixed
/// elements.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantArray {
    /// The built-in type of the elements.
    pub element_type: BuiltInType,
    /// The elements.
    pub values: Vec<Variant>,
}

impl VariantArray {
    /// Creates an array, validating element/type consistency.
    pub fn new(element_type: BuiltInType, values: Vec<Variant>) -> EncodingResult<Self> {
        check_element_types(element_type, &values)?;
        Ok(VariantArray {
            element_type,
            values,
        })
    }

    /// Creates an empty array of the given element type with reserved
    /// capacity. Used by the array decoders before populating elements.
    pub fn with_capacity(element_type: BuiltInType, capacity: usize) -> Self {
        VariantArray {
            element_type,
            values: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the array has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// =============================================================================
// Matrix
// =============================================================================

/// An N-dimensional array: flat row-major elements plus a dimension vector.
///
/// Invariant, checked at construction: `dimensions.len() >= 2` and
/// `product(dimensions) == elements.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    /// The built-in type of the elements.
    pub element_type: BuiltInType,
    /// Flat element storage, row-major.
    pub elements: Vec<Variant>,
    /// Size of each dimension, outermost first.
    pub dimensions: Vec<u32>,
}

impl Matrix {
    /// Creates a matrix from flat storage and an explicit dimension vector.
    ///
    /// Fails with a decoding error when the dimension product does not match
    /// the element count, or when fewer than two dimensions are supplied.
    pub fn new(
        element_type: BuiltInType,
        elements: Vec<Variant>,
        dimensions: Vec<u32>,
    ) -> EncodingResult<Self> {
        if dimensions.len() < 2 {
            return Err(EncodingError::decoding(format!(
                "matrix requires at least 2 dimensions, got {}",
                dimensions.len()
            )));
        }
        validate_dimensions(&dimensions, elements.len(), 0)?;
        check_element_types(element_type, &elements)?;
        Ok(Matrix {
            element_type,
            elements,
            dimensions,
        })
    }

    /// Returns the number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the matrix has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Reshapes the flat storage into genuinely nested arrays, outermost
    /// dimension first. This is the shape application code consumes and the
    /// shape the compact/verbose JSON encodings write.
    pub fn to_nested(&self) -> Variant {
        nest(&self.elements, &self.dimensions, self.element_type)
    }
}

fn nest(elements: &[Variant], dimensions: &[u32], element_type: BuiltInType) -> Variant {
    if dimensions.len() <= 1 {
        return Variant::Array(Box::new(VariantArray {
            element_type,
            values: elements.to_vec(),
        }));
    }
    let outer = dimensions[0] as usize;
    let stride = elements.len() / outer.max(1);
    let values = (0..outer)
        .map(|i| nest(&elements[i * stride..(i + 1) * stride], &dimensions[1..], element_type))
        .collect();
    Variant::Array(Box::new(VariantArray {
        element_type: BuiltInType::Variant,
        values,
    }))
}

// =============================================================================
// Validation
// =============================================================================

/// Validates a dimension vector against an element count and the configured
/// maximum array length, returning the computed total size.
///
/// Shared by the encoders and decoders so both reject a malformed matrix
/// identically, before allocating element storage. A `max_array_length` of
/// zero means unlimited.
pub fn validate_dimensions(
    dimensions: &[u32],
    element_count: usize,
    max_array_length: usize,
) -> EncodingResult<usize> {
    if dimensions.is_empty() {
        return Err(EncodingError::decoding("matrix dimension vector is empty"));
    }
    let mut total: usize = 1;
    for &dim in dimensions {
        total = total.checked_mul(dim as usize).ok_or_else(|| {
            EncodingError::limits_exceeded("matrix dimension product overflows")
        })?;
    }
    if max_array_length > 0 && total > max_array_length {
        return Err(EncodingError::limits_exceeded(format!(
            "matrix with {total} elements exceeds maximum array length {max_array_length}"
        )));
    }
    if total != element_count {
        return Err(EncodingError::decoding(format!(
            "matrix dimensions {dimensions:?} imply {total} elements, got {element_count}"
        )));
    }
    Ok(total)
}

fn check_element_types(element_type: BuiltInType, values: &[Variant]) -> EncodingResult<()> {
    if element_type == BuiltInType::Variant {
        return Ok(());
    }
    for value in values {
        let actual = value.builtin_type();
        if actual != BuiltInType::Null && actual.normalized() != element_type.normalized() {
            return Err(EncodingError::not_supported(format!(
                "array element of type {actual} in an array of {element_type}"
            )));
        }
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn int_elements(values: &[i32]) -> Vec<Variant> {
        values.iter().map(|&v| Variant::from(v)).collect()
    }

    #[test]
    fn test_matrix_construction() {
        let matrix = Matrix::new(
            BuiltInType::Int32,
            int_elements(&[1, 2, 3, 4, 5, 6]),
            vec![2, 3],
        )
        .unwrap();
        assert_eq!(matrix.len(), 6);
        assert_eq!(matrix.dimensions, vec![2, 3]);
    }

    #[test]
    fn test_matrix_dimension_mismatch_rejected() {
        let result = Matrix::new(BuiltInType::Int32, int_elements(&[1, 2, 3]), vec![2, 3]);
        assert!(result.is_err());

        let too_few_dims = Matrix::new(BuiltInType::Int32, int_elements(&[1, 2]), vec![2]);
        assert!(too_few_dims.is_err());
    }

    #[test]
    fn test_validate_dimensions_limit() {
        assert_eq!(validate_dimensions(&[2, 3], 6, 0).unwrap(), 6);
        assert_eq!(validate_dimensions(&[2, 3], 6, 6).unwrap(), 6);
        assert!(validate_dimensions(&[2, 3], 6, 5).unwrap_err().is_limit_violation());
        assert!(validate_dimensions(&[2, 3], 5, 0).is_err());
    }

    #[test]
    fn test_validate_dimensions_overflow() {
        let error = validate_dimensions(&[u32::MAX, u32::MAX, u32::MAX], 0, 0).unwrap_err();
        assert!(error.is_limit_violation());
    }

    #[test]
    fn test_validate_zero_dimension() {
        // A zero-sized dimension is legal and implies zero elements.
        assert_eq!(validate_dimensions(&[0, 5], 0, 0).unwrap(), 0);
    }

    #[test]
    fn test_matrix_to_nested() {
        let matrix = Matrix::new(
            BuiltInType::Int32,
            int_elements(&[1, 2, 3, 4, 5, 6]),
            vec![2, 3],
        )
        .unwrap();
        let nested = matrix.to_nested();
        let rows = nested.as_array().expect("outer array");
        assert_eq!(rows.len(), 2);
        let first_row = rows.values[0].as_array().expect("inner array");
        assert_eq!(first_row.values, int_elements(&[1, 2, 3]));
    }

    #[test]
    fn test_array_element_type_enforcement() {
        let mixed = vec![Variant::from(1i32), Variant::from("x")];
        assert!(VariantArray::new(BuiltInType::Int32, mixed.clone()).is_err());
        assert!(VariantArray::new(BuiltInType::Variant, mixed).is_ok());

        // Null elements are allowed in any typed array.
        let with_null = vec![Variant::from(1i32), Variant::Null];
        assert!(VariantArray::new(BuiltInType::Int32, with_null).is_ok());
    }
}
