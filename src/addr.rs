//! Conversions between the integer form of an IPv4 address used to walk a
//! range (host order, `1.2.3.4 == 0x01020304`) and its other shapes.

use std::net::Ipv4Addr;

/// Digits read per octet, a longer field ends parsing.
const MAX_OCTET_DIGITS: usize = 3;

/// Splits `ip` into network order bytes.
#[inline]
pub fn encode(ip: u32) -> [u8; 4] {
    ip.to_be_bytes()
}

/// Dotted decimal text of `ip`, at most 15 characters.
pub fn to_text(ip: u32) -> String {
    let [a, b, c, d] = encode(ip);
    format!("{}.{}.{}.{}", a, b, c, d)
}

#[inline]
pub fn to_ipv4(ip: u32) -> Ipv4Addr {
    Ipv4Addr::from(encode(ip))
}

/// Parses dotted decimal text without ever failing.
///
/// Each octet is the run of up to three leading digits of its field, values
/// above 255 keep their low byte. Parsing ends after the first field that
/// doesn't consist of those digits alone (no digits, a fourth digit, any other
/// trailing character) and every octet not read is zero.
pub fn from_text(text: &str) -> u32 {
    let mut octets = [0u32; 4];
    let mut fields = text.trim().split('.');

    for (i, octet) in octets.iter_mut().enumerate() {
        let Some(field) = fields.next() else {
            log::debug!("Address `{}` has only {} octet(s), rest is zero", text, i);
            break;
        };

        let digits = field
            .bytes()
            .take(MAX_OCTET_DIGITS)
            .take_while(u8::is_ascii_digit)
            .count();

        if digits == 0 {
            log::debug!("Address `{}` has a non numeric octet, rest is zero", text);
            break;
        }

        *octet = field[..digits]
            .bytes()
            .fold(0, |acc, d| acc * 10 + u32::from(d - b'0'))
            & 0xff;

        if digits < field.len() {
            log::debug!("Address `{}` has a malformed octet `{}`, rest is zero", text, field);
            break;
        }
    }

    octets.iter().fold(0, |ip, octet| (ip << 8) | octet)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn known_address() {
        assert_eq!(from_text("1.2.3.4"), 0x01020304);
        assert_eq!(to_text(0x01020304), "1.2.3.4");
        assert_eq!(encode(0x01020304), [1, 2, 3, 4]);
    }

    #[test]
    fn extremes() {
        assert_eq!(to_text(0), "0.0.0.0");
        assert_eq!(to_text(u32::MAX), "255.255.255.255");
        assert_eq!(from_text("255.255.255.255"), u32::MAX);
    }

    #[test]
    fn agrees_with_std() {
        assert_eq!(to_ipv4(0x0a000001), Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(u32::from(Ipv4Addr::new(81, 177, 141, 230)), from_text("81.177.141.230"));
    }

    #[test]
    fn leading_zeros_are_normalized() {
        assert_eq!(to_text(from_text("010.001.000.009")), "10.1.0.9");
    }

    #[test]
    fn oversized_octet_is_truncated() {
        assert_eq!(from_text("1.300.3.4"), 0x01_2c_03_04);
    }

    #[test]
    fn malformed_input_is_zero_filled() {
        assert_eq!(from_text("10.20"), 0x0a14_0000);
        assert_eq!(from_text("10.x.3.4"), 0x0a00_0000);
        assert_eq!(from_text("garbage"), 0);
        assert_eq!(from_text(""), 0);
    }

    #[test]
    fn trailing_junk_ends_parsing() {
        assert_eq!(to_text(from_text("1.2a.3.4")), "1.2.0.0");
        assert_eq!(to_text(from_text("1.2.3.4x")), "1.2.3.4");
    }

    #[test]
    fn fourth_digit_ends_parsing() {
        assert_eq!(to_text(from_text("1234.5.6.7")), "123.0.0.0");
        assert_eq!(to_text(from_text("10.0.0.2555")), "10.0.0.255");
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(from_text(" 192.168.0.1\n"), 0xc0a8_0001);
    }

    proptest! {
        #[test]
        fn text_round_trip(a: u8, b: u8, c: u8, d: u8) {
            let text = format!("{}.{}.{}.{}", a, b, c, d);
            prop_assert_eq!(to_text(from_text(&text)), text);
        }

        #[test]
        fn integer_round_trip(ip: u32) {
            prop_assert_eq!(from_text(&to_text(ip)), ip);
        }
    }
}
