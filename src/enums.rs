//! Currency metadata consumed by amount conversion.

/// ISO 4217 currency codes accepted by the hosted payment pages, with their
/// minor-unit exponents.
#[allow(clippy::upper_case_acronyms)]
#[allow(missing_docs)]
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
pub enum Currency {
    AED,
    ARS,
    AUD,
    BHD,
    BIF,
    BRL,
    CAD,
    CHF,
    CLP,
    CNY,
    CZK,
    DJF,
    DKK,
    EGP,
    EUR,
    GBP,
    GNF,
    HKD,
    HUF,
    IDR,
    ILS,
    INR,
    IQD,
    JOD,
    JPY,
    KMF,
    KRW,
    KWD,
    LYD,
    MGA,
    MXN,
    MYR,
    NOK,
    NZD,
    OMR,
    PHP,
    PLN,
    PYG,
    RON,
    RSD,
    RUB,
    RWF,
    SAR,
    SEK,
    SGD,
    THB,
    TND,
    TRY,
    TWD,
    UGX,
    USD,
    VND,
    VUV,
    XAF,
    XOF,
    XPF,
    ZAR,
}

impl Currency {
    /// Returns true for currencies with no minor unit (amounts are already
    /// whole units).
    pub fn is_zero_decimal_currency(self) -> bool {
        matches!(
            self,
            Self::BIF
                | Self::CLP
                | Self::DJF
                | Self::GNF
                | Self::JPY
                | Self::KMF
                | Self::KRW
                | Self::MGA
                | Self::PYG
                | Self::RWF
                | Self::UGX
                | Self::VND
                | Self::VUV
                | Self::XAF
                | Self::XOF
                | Self::XPF
        )
    }

    /// Returns true for currencies whose minor unit is a thousandth.
    pub fn is_three_decimal_currency(self) -> bool {
        matches!(
            self,
            Self::BHD | Self::IQD | Self::JOD | Self::KWD | Self::LYD | Self::OMR | Self::TND
        )
    }

    /// Minor-unit exponent for this currency.
    pub fn number_of_digits_after_decimal_point(self) -> u8 {
        if self.is_zero_decimal_currency() {
            0
        } else if self.is_three_decimal_currency() {
            3
        } else {
            2
        }
    }
}
