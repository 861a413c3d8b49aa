//! Core 5G types used by the xApps: PLMN, S-NSSAI and GUAMI.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Public Land Mobile Network identifier.
///
/// - MCC (Mobile Country Code): 3 decimal digits (001-999)
/// - MNC (Mobile Network Code): 2 or 3 decimal digits
///
/// The `long_mnc` field indicates whether the MNC uses 3 digits (true) or 2 digits (false).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Plmn {
    /// Mobile Country Code (3 digits, range 0-999)
    pub mcc: u16,
    /// Mobile Network Code (2-3 digits, range 0-999)
    pub mnc: u16,
    /// True if MNC is 3 digits, false if 2 digits
    #[serde(default)]
    pub long_mnc: bool,
}

impl Plmn {
    /// Creates a new PLMN with the given MCC and MNC.
    pub const fn new(mcc: u16, mnc: u16, long_mnc: bool) -> Self {
        Self { mcc, mnc, long_mnc }
    }

    /// Parses the textual form used in RAN parameters (`"00101"`, `"310410"`).
    ///
    /// Five digits give a 2-digit MNC, six digits a 3-digit MNC.
    pub fn from_digits(digits: &str) -> Option<Self> {
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let long_mnc = match digits.len() {
            5 => false,
            6 => true,
            _ => return None,
        };
        let mcc = digits.get(..3)?.parse().ok()?;
        let mnc = digits.get(3..)?.parse().ok()?;
        Some(Self { mcc, mnc, long_mnc })
    }

    /// Returns true if this PLMN has valid values set.
    pub fn has_value(&self) -> bool {
        self.mcc > 0 || self.mnc > 0
    }

    /// Number of MNC digits (2 or 3).
    pub fn mnc_digit_len(&self) -> u8 {
        if self.long_mnc {
            3
        } else {
            2
        }
    }
}

impl fmt::Debug for Plmn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.long_mnc {
            write!(f, "Plmn({:03}-{:03})", self.mcc, self.mnc)
        } else {
            write!(f, "Plmn({:03}-{:02})", self.mcc, self.mnc)
        }
    }
}

impl fmt::Display for Plmn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.long_mnc {
            write!(f, "{:03}{:03}", self.mcc, self.mnc)
        } else {
            write!(f, "{:03}{:02}", self.mcc, self.mnc)
        }
    }
}

/// Single Network Slice Selection Assistance Information.
///
/// Standard SST values (3GPP TS 23.501):
/// - 1: eMBB (enhanced Mobile Broadband)
/// - 2: URLLC (Ultra-Reliable Low-Latency Communications)
/// - 3: MIoT (Massive IoT)
/// - 4: V2X (Vehicle-to-Everything)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SNssai {
    /// Slice/Service Type (8-bit)
    pub sst: u8,
    /// Slice Differentiator (optional 24-bit value)
    #[serde(default)]
    pub sd: Option<[u8; 3]>,
}

impl SNssai {
    /// Creates a new S-NSSAI with only SST (no SD).
    pub const fn new(sst: u8) -> Self {
        Self { sst, sd: None }
    }

    /// Creates a new S-NSSAI with SST and SD.
    pub const fn with_sd(sst: u8, sd: [u8; 3]) -> Self {
        Self { sst, sd: Some(sd) }
    }

    /// Creates a new S-NSSAI with SST and SD from a u32 value (lower 24 bits).
    pub const fn with_sd_u32(sst: u8, sd: u32) -> Self {
        Self {
            sst,
            sd: Some([
                ((sd >> 16) & 0xFF) as u8,
                ((sd >> 8) & 0xFF) as u8,
                (sd & 0xFF) as u8,
            ]),
        }
    }

    /// Returns the SD as a u32 value, or None if SD is not set.
    pub fn sd_as_u32(&self) -> Option<u32> {
        self.sd
            .map(|sd| ((sd[0] as u32) << 16) | ((sd[1] as u32) << 8) | (sd[2] as u32))
    }

    /// Encodes the S-NSSAI to the compact 3GPP format (TS 24.501).
    ///
    /// Returns 1 byte if SD is None, 4 bytes if SD is present.
    pub fn encode(&self) -> Vec<u8> {
        match self.sd {
            Some(sd) => vec![self.sst, sd[0], sd[1], sd[2]],
            None => vec![self.sst],
        }
    }

    /// The 4-octet `{sst, sd16, sd8, sd0}` form used by KPM test conditions.
    ///
    /// A missing SD is sent as `000000`.
    pub fn filter_octets(&self) -> [u8; 4] {
        let sd = self.sd.unwrap_or([0, 0, 0]);
        [self.sst, sd[0], sd[1], sd[2]]
    }
}

impl fmt::Debug for SNssai {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sd_as_u32() {
            Some(sd) => write!(f, "SNssai(sst={}, sd={:06X})", self.sst, sd),
            None => write!(f, "SNssai(sst={})", self.sst),
        }
    }
}

impl fmt::Display for SNssai {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sd_as_u32() {
            Some(sd) => write!(f, "{}-{:06X}", self.sst, sd),
            None => write!(f, "{}", self.sst),
        }
    }
}

/// Globally Unique AMF Identifier (3GPP TS 23.003 Section 2.10.1).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Guami {
    /// Public Land Mobile Network identifier
    pub plmn: Plmn,
    /// AMF Region ID (8-bit)
    pub amf_region_id: u8,
    /// AMF Set ID (10-bit, range 0-1023)
    pub amf_set_id: u16,
    /// AMF Pointer (6-bit, range 0-63)
    pub amf_pointer: u8,
}

impl Guami {
    /// Maximum value for AMF Set ID (10-bit)
    pub const MAX_AMF_SET_ID: u16 = 0x3FF;
    /// Maximum value for AMF Pointer (6-bit)
    pub const MAX_AMF_POINTER: u8 = 0x3F;

    /// Creates a new GUAMI; set id and pointer are masked to their bit widths.
    pub fn new(plmn: Plmn, amf_region_id: u8, amf_set_id: u16, amf_pointer: u8) -> Self {
        Self {
            plmn,
            amf_region_id,
            amf_set_id: amf_set_id & Self::MAX_AMF_SET_ID,
            amf_pointer: amf_pointer & Self::MAX_AMF_POINTER,
        }
    }

    /// Returns the AMF Identifier (AMFI) as a 24-bit value.
    pub fn amf_id(&self) -> u32 {
        ((self.amf_region_id as u32) << 16)
            | ((self.amf_set_id as u32 & 0x3FF) << 6)
            | (self.amf_pointer as u32 & 0x3F)
    }
}

impl fmt::Debug for Guami {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guami({:?}, amfi={:06X})", self.plmn, self.amf_id())
    }
}
