/// Numeric type of chart data as declared by the application.
///
/// Only a fixed subset is storable in chart geometry buffers; see
/// [`DataType::is_supported`]. The 64-bit types exist so callers can declare
/// what their data actually is and get a typed rejection.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DataType {
    F32,
    I32,
    U32,
    I16,
    U16,
    I8,
    U8,
    F64,
    I64,
    U64,
}

impl DataType {
    /// Size of one element in bytes.
    #[inline]
    pub const fn byte_width(self) -> u64 {
        match self {
            DataType::F32 | DataType::I32 | DataType::U32 => 4,
            DataType::I16 | DataType::U16 => 2,
            DataType::I8 | DataType::U8 => 1,
            DataType::F64 | DataType::I64 | DataType::U64 => 8,
        }
    }

    /// Whether chart geometry may be stored in this type.
    #[inline]
    pub const fn is_supported(self) -> bool {
        !matches!(self, DataType::F64 | DataType::I64 | DataType::U64)
    }
}

/// Plain-old-data element types that can be uploaded into chart buffers.
pub trait Element: bytemuck::Pod {
    const DATA_TYPE: DataType;
}

macro_rules! impl_element {
    ($($t:ty => $v:ident),* $(,)?) => {
        $(impl Element for $t {
            const DATA_TYPE: DataType = DataType::$v;
        })*
    };
}

impl_element! {
    f32 => F32,
    i32 => I32,
    u32 => U32,
    i16 => I16,
    u16 => U16,
    i8 => I8,
    u8 => U8,
    f64 => F64,
    i64 => I64,
    u64 => U64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_match_rust_types() {
        assert_eq!(DataType::F32.byte_width(), size_of::<f32>() as u64);
        assert_eq!(DataType::I16.byte_width(), size_of::<i16>() as u64);
        assert_eq!(DataType::U8.byte_width(), size_of::<u8>() as u64);
        assert_eq!(DataType::F64.byte_width(), size_of::<f64>() as u64);
    }

    #[test]
    fn sixty_four_bit_types_are_unsupported() {
        assert!(!DataType::F64.is_supported());
        assert!(!DataType::I64.is_supported());
        assert!(!DataType::U64.is_supported());
        assert!(DataType::I8.is_supported());
    }

    #[test]
    fn element_trait_maps_types() {
        assert_eq!(<f32 as Element>::DATA_TYPE, DataType::F32);
        assert_eq!(<u16 as Element>::DATA_TYPE, DataType::U16);
    }
}
