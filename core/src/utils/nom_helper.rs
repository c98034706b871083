/**
 * Directory security data is stored as little endian binary structures, with a few big endian fields
 * (SID identifier authority). These helpers turn X bytes into a number in one step:
 *   `take X bytes`  
 *   `le_uX` to number
 */
use nom::{
    bytes::complete::take,
    number::complete::{be_u16, be_u32, be_u8, le_u16, le_u32, le_u8},
};
use std::mem::size_of;

pub(crate) enum Endian {
    /**Little Endian */
    Le,
    /**Big Endian */
    Be,
}

/**
 * Nom four (4) bytes to u32
 * Need to specify Endianess
 */
pub(crate) fn nom_unsigned_four_bytes(data: &[u8], endian: Endian) -> nom::IResult<&[u8], u32> {
    let (input, value_data) = take(size_of::<u32>())(data)?;

    let (_, value) = match endian {
        Endian::Le => le_u32(value_data)?,
        Endian::Be => be_u32(value_data)?,
    };

    Ok((input, value))
}

/**
 * Nom two (2) bytes to u16
 * Need to specify Endianess
 */
pub(crate) fn nom_unsigned_two_bytes(data: &[u8], endian: Endian) -> nom::IResult<&[u8], u16> {
    let (input, value_data) = take(size_of::<u16>())(data)?;

    let (_, value) = match endian {
        Endian::Le => le_u16(value_data)?,
        Endian::Be => be_u16(value_data)?,
    };
    Ok((input, value))
}

/**
 * Nom one (1) bytes to u8
 * Need to specify Endianess
 */
pub(crate) fn nom_unsigned_one_byte(data: &[u8], endian: Endian) -> nom::IResult<&[u8], u8> {
    let (input, value_data) = take(size_of::<u8>())(data)?;

    let (_, value) = match endian {
        Endian::Le => le_u8(value_data)?,
        Endian::Be => be_u8(value_data)?,
    };
    Ok((input, value))
}

/// Nom sixteen (16) bytes without converting them. Used for GUIDs
pub(crate) fn nom_sixteen_bytes(data: &[u8]) -> nom::IResult<&[u8], [u8; 16]> {
    let (input, value_data) = take(size_of::<u128>())(data)?;

    let mut value = [0; 16];
    value.copy_from_slice(value_data);
    Ok((input, value))
}

/// Build a nom failure pointing at the provided input. Used when a fixed field has an unexpected value
pub(crate) fn nom_verify_failure(data: &[u8]) -> nom::Err<nom::error::Error<&[u8]>> {
    nom::Err::Failure(nom::error::Error::new(
        data,
        nom::error::ErrorKind::Verify,
    ))
}
