//! Raw supplicant enumerations mapped onto event categories.

use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, Malformed};

/// WPS device password ids (Wi-Fi Simple Config).
pub mod password_id {
    pub const DEFAULT: i32 = 0;
    pub const USER_SPECIFIED: i32 = 1;
    pub const MACHINE_SPECIFIED: i32 = 2;
    pub const REKEY: i32 = 3;
    pub const PUSHBUTTON: i32 = 4;
    pub const REGISTRAR_SPECIFIED: i32 = 5;
}

/// WPS config method bits.
pub mod config_methods {
    pub const USBA: u16 = 0x0001;
    pub const ETHERNET: u16 = 0x0002;
    pub const LABEL: u16 = 0x0004;
    pub const DISPLAY: u16 = 0x0008;
    pub const PUSHBUTTON: u16 = 0x0080;
    pub const KEYPAD: u16 = 0x0100;
    pub const VIRT_PUSHBUTTON: u16 = 0x0280;
    pub const VIRT_DISPLAY: u16 = 0x2008;
}

/// Provision discovery status codes.
pub mod prov_disc_status {
    pub const SUCCESS: u8 = 0;
    pub const TIMEOUT: u8 = 1;
    pub const REJECTED: u8 = 2;
    pub const TIMEOUT_JOIN: u8 = 3;
    pub const INFO_UNAVAILABLE: u8 = 4;
}

/// WPS setup method requested by a GO negotiation peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WpsSetup {
    Pbc,
    Display,
    Keypad,
}

/// Password id to setup method. Unknown ids fall back to push-button.
pub fn wps_setup(password_id: i32) -> WpsSetup {
    match password_id {
        password_id::USER_SPECIFIED => WpsSetup::Display,
        password_id::PUSHBUTTON => WpsSetup::Pbc,
        password_id::REGISTRAR_SPECIFIED => WpsSetup::Keypad,
        _ => WpsSetup::Pbc,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProvisionFailure {
    Timeout,
    Rejected,
    TimeoutJoin,
    InfoUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProvisionOutcome {
    EnterPin,
    ShowPin(String),
    PbcRequest,
    PbcResponse,
    Failure(ProvisionFailure),
}

/// Classify a successful provision discovery by advertised config methods.
/// Push-button depends on direction; keypad and display do not.
pub fn provision_outcome(
    methods: u16,
    is_request: bool,
    pin: &str,
) -> Result<ProvisionOutcome, Malformed> {
    if methods & config_methods::PUSHBUTTON != 0 {
        Ok(if is_request {
            ProvisionOutcome::PbcRequest
        } else {
            ProvisionOutcome::PbcResponse
        })
    } else if methods & config_methods::KEYPAD != 0 {
        Ok(ProvisionOutcome::EnterPin)
    } else if methods & config_methods::DISPLAY != 0 {
        Ok(ProvisionOutcome::ShowPin(pin.to_string()))
    } else {
        Err(Malformed::UnsupportedConfigMethods(methods))
    }
}

/// `Ok(None)` on success, `Ok(Some(reason))` on a known failure.
pub fn provision_failure(status: u8) -> Result<Option<ProvisionFailure>, DecodeError> {
    match status {
        prov_disc_status::SUCCESS => Ok(None),
        prov_disc_status::TIMEOUT => Ok(Some(ProvisionFailure::Timeout)),
        prov_disc_status::REJECTED => Ok(Some(ProvisionFailure::Rejected)),
        prov_disc_status::TIMEOUT_JOIN => Ok(Some(ProvisionFailure::TimeoutJoin)),
        prov_disc_status::INFO_UNAVAILABLE => Ok(Some(ProvisionFailure::InfoUnavailable)),
        other => Err(DecodeError::UnmappedEnum {
            table: "provision discovery status",
            value: other as i32,
        }),
    }
}

/// P2P status codes reported for GO negotiation and invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum P2pStatus {
    Success,
    InformationIsCurrentlyUnavailable,
    IncompatibleParameters,
    LimitReached,
    InvalidParameter,
    UnableToAccommodateRequest,
    PreviousProtocolError,
    NoCommonChannel,
    UnknownP2pGroup,
    BothGoIntent15,
    IncompatibleProvisioningMethod,
    RejectedByUser,
    SuccessDeferred,
}

impl P2pStatus {
    pub fn from_code(code: i32) -> Result<P2pStatus, DecodeError> {
        use P2pStatus::*;
        Ok(match code {
            0 => Success,
            1 => InformationIsCurrentlyUnavailable,
            2 => IncompatibleParameters,
            3 => LimitReached,
            4 => InvalidParameter,
            5 => UnableToAccommodateRequest,
            6 => PreviousProtocolError,
            7 => NoCommonChannel,
            8 => UnknownP2pGroup,
            9 => BothGoIntent15,
            10 => IncompatibleProvisioningMethod,
            11 => RejectedByUser,
            12 => SuccessDeferred,
            value => {
                return Err(DecodeError::UnmappedEnum {
                    table: "p2p status",
                    value,
                })
            }
        })
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_ids() {
        assert_eq!(wps_setup(password_id::USER_SPECIFIED), WpsSetup::Display);
        assert_eq!(wps_setup(password_id::PUSHBUTTON), WpsSetup::Pbc);
        assert_eq!(wps_setup(password_id::REGISTRAR_SPECIFIED), WpsSetup::Keypad);
    }

    #[test]
    fn unknown_password_id_defaults_to_pbc() {
        assert_eq!(wps_setup(0xffff), WpsSetup::Pbc);
        assert_eq!(wps_setup(password_id::DEFAULT), WpsSetup::Pbc);
        assert_eq!(wps_setup(-1), WpsSetup::Pbc);
    }

    #[test]
    fn keypad_is_direction_independent() {
        for is_request in [true, false] {
            assert_eq!(
                provision_outcome(config_methods::KEYPAD, is_request, "1234"),
                Ok(ProvisionOutcome::EnterPin)
            );
        }
    }

    #[test]
    fn display_shows_pin_either_direction() {
        for is_request in [true, false] {
            assert_eq!(
                provision_outcome(config_methods::DISPLAY, is_request, "12345678"),
                Ok(ProvisionOutcome::ShowPin("12345678".into()))
            );
        }
        assert_eq!(
            provision_outcome(config_methods::VIRT_DISPLAY, false, "1"),
            Ok(ProvisionOutcome::ShowPin("1".into()))
        );
    }

    #[test]
    fn pushbutton_follows_direction() {
        assert_eq!(
            provision_outcome(config_methods::PUSHBUTTON, true, ""),
            Ok(ProvisionOutcome::PbcRequest)
        );
        assert_eq!(
            provision_outcome(config_methods::VIRT_PUSHBUTTON, false, ""),
            Ok(ProvisionOutcome::PbcResponse)
        );
    }

    #[test]
    fn unsupported_methods() {
        assert_eq!(
            provision_outcome(config_methods::LABEL | config_methods::USBA, true, ""),
            Err(Malformed::UnsupportedConfigMethods(0x0005))
        );
    }

    #[test]
    fn provision_statuses() {
        assert_eq!(provision_failure(prov_disc_status::SUCCESS), Ok(None));
        assert_eq!(
            provision_failure(prov_disc_status::TIMEOUT),
            Ok(Some(ProvisionFailure::Timeout))
        );
        assert_eq!(
            provision_failure(prov_disc_status::REJECTED),
            Ok(Some(ProvisionFailure::Rejected))
        );
        assert_eq!(
            provision_failure(prov_disc_status::TIMEOUT_JOIN),
            Ok(Some(ProvisionFailure::TimeoutJoin))
        );
        assert_eq!(
            provision_failure(prov_disc_status::INFO_UNAVAILABLE),
            Ok(Some(ProvisionFailure::InfoUnavailable))
        );
    }

    #[test]
    fn unmapped_provision_status_is_error() {
        assert_eq!(
            provision_failure(9),
            Err(DecodeError::UnmappedEnum {
                table: "provision discovery status",
                value: 9
            })
        );
    }

    #[test]
    fn p2p_status_codes() {
        assert_eq!(P2pStatus::from_code(0), Ok(P2pStatus::Success));
        assert_eq!(
            P2pStatus::from_code(1),
            Ok(P2pStatus::InformationIsCurrentlyUnavailable)
        );
        assert_eq!(P2pStatus::from_code(12), Ok(P2pStatus::SuccessDeferred));
        for code in 0..=12 {
            assert_eq!(P2pStatus::from_code(code).unwrap().code(), code);
        }
        assert!(P2pStatus::from_code(13).is_err());
        assert!(P2pStatus::from_code(-1).is_err());
    }
}
