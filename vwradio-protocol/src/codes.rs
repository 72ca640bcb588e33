//! Symbolic code tables shared by the host and the rig firmware.
//!
//! Every table is declared once through [`code_table!`], which emits the
//! enum, its `code -> variant` and `variant -> name` mappings, and the
//! `ALL` slice from the same list. A duplicated code is a compile error
//! (two discriminants with one value), so the lookups stay exhaustive.

/// Declare a `#[repr(u8)]` code table.
macro_rules! code_table {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $code:literal => $label:literal,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[repr(u8)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant = $code,
            )+
        }

        impl $name {
            /// Every member, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Numeric wire code.
            pub const fn code(self) -> u8 {
                self as u8
            }

            /// Symbolic name as used by the firmware sources.
            pub const fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            /// Map a wire code back to its member.
            pub const fn from_code(code: u8) -> Option<Self> {
                match code {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// Reverse lookup: the symbolic name of `code`, if it is declared.
            pub fn lookup_name(code: u8) -> Option<&'static str> {
                Self::from_code(code).map(Self::name)
            }
        }

        impl TryFrom<u8> for $name {
            type Error = u8;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                Self::from_code(value).ok_or(value)
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> Self {
                value as u8
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

pub(crate) use code_table;

code_table! {
    /// Head unit operating mode, grouped by tens digit.
    pub enum OperationMode {
        Unknown = 0 => "UNKNOWN",
        // Anti-theft (10s)
        SafeEntry = 10 => "SAFE_ENTRY",
        SafeLocked = 11 => "SAFE_LOCKED",
        SafeNoCode = 12 => "SAFE_NO_CODE",
        // Tuner (20s)
        TunerPlaying = 20 => "TUNER_PLAYING",
        TunerScanning = 21 => "TUNER_SCANNING",
        // CD (30s)
        CdPlaying = 30 => "CD_PLAYING",
        CdCue = 31 => "CD_CUE",
        CdRev = 32 => "CD_REV",
        CdNoDisc = 33 => "CD_NO_DISC",
        CdNoChanger = 34 => "CD_NO_CHANGER",
        CdCheckMagazine = 35 => "CD_CHECK_MAGAZINE",
        CdCdxNoCd = 36 => "CD_CDX_NO_CD",
        CdCdxCdErr = 37 => "CD_CDX_CD_ERR",
        CdScanning = 38 => "CD_SCANNING",
        // Tape (40s)
        TapePlaying = 40 => "TAPE_PLAYING",
        TapeLoad = 41 => "TAPE_LOAD",
        TapeMetal = 42 => "TAPE_METAL",
        TapeFf = 43 => "TAPE_FF",
        TapeRew = 44 => "TAPE_REW",
        TapeMssFf = 45 => "TAPE_MSS_FF",
        TapeMssRew = 46 => "TAPE_MSS_REW",
        TapeNoTape = 47 => "TAPE_NO_TAPE",
        TapeError = 48 => "TAPE_ERROR",
        TapeScanning = 49 => "TAPE_SCANNING",
        Initializing = 50 => "INITIALIZING",
        Diagnostics = 60 => "DIAGNOSTICS",
        // Settings (70s)
        SettingOnVol = 70 => "SETTING_ON_VOL",
        SettingCdMix = 71 => "SETTING_CD_MIX",
        SettingTapeSkip = 72 => "SETTING_TAPE_SKIP",
        // Self-test (80s)
        TestingFern = 80 => "TESTING_FERN",
        TestingRad = 81 => "TESTING_RAD",
        TestingVer = 82 => "TESTING_VER",
    }
}

code_table! {
    /// What the VFD is currently showing.
    pub enum DisplayMode {
        Unknown = 0 => "UNKNOWN",
        ShowingOperation = 10 => "SHOWING_OPERATION",
        AdjustingSoundVolume = 20 => "ADJUSTING_SOUND_VOLUME",
        AdjustingSoundBalance = 21 => "ADJUSTING_SOUND_BALANCE",
        AdjustingSoundFade = 22 => "ADJUSTING_SOUND_FADE",
        AdjustingSoundBass = 23 => "ADJUSTING_SOUND_BASS",
        AdjustingSoundTreble = 24 => "ADJUSTING_SOUND_TREBLE",
        AdjustingSoundMidrange = 25 => "ADJUSTING_SOUND_MIDRANGE",
    }
}

code_table! {
    /// Tuner band.
    pub enum TunerBand {
        Unknown = 0 => "UNKNOWN",
        Fm1 = 1 => "FM1",
        Fm2 = 2 => "FM2",
        Am = 3 => "AM",
    }
}

code_table! {
    /// Faceplate keys, including the hidden service combinations.
    pub enum Key {
        None = 0 => "NONE",
        Preset1 = 1 => "PRESET_1",
        Preset2 = 2 => "PRESET_2",
        Preset3 = 3 => "PRESET_3",
        Preset4 = 4 => "PRESET_4",
        Preset5 = 5 => "PRESET_5",
        Preset6 = 6 => "PRESET_6",
        Power = 7 => "POWER",
        SoundBass = 10 => "SOUND_BASS",
        SoundTreb = 11 => "SOUND_TREB",
        SoundFade = 12 => "SOUND_FADE",
        SoundBal = 13 => "SOUND_BAL",
        SoundMid = 14 => "SOUND_MID",
        SoundFb = 15 => "SOUND_FB",
        TuneUp = 20 => "TUNE_UP",
        TuneDown = 21 => "TUNE_DOWN",
        SeekUp = 22 => "SEEK_UP",
        SeekDown = 23 => "SEEK_DOWN",
        Scan = 24 => "SCAN",
        ModeCd = 30 => "MODE_CD",
        ModeAm = 31 => "MODE_AM",
        ModeFm = 32 => "MODE_FM",
        ModeTape = 33 => "MODE_TAPE",
        TapeSide = 40 => "TAPE_SIDE",
        StopEject = 41 => "STOP_EJECT",
        MixDolby = 42 => "MIX_DOLBY",
        HiddenInitial = 50 => "HIDDEN_INITIAL",
        HiddenNoCode = 51 => "HIDDEN_NO_CODE",
        HiddenVolUp = 52 => "HIDDEN_VOL_UP",
        HiddenVolDown = 53 => "HIDDEN_VOL_DOWN",
        HiddenSeekUp = 54 => "HIDDEN_SEEK_UP",
        HiddenSeekDown = 55 => "HIDDEN_SEEK_DOWN",
    }
}

code_table! {
    /// Pictograph segments on the VFD.
    pub enum Pictograph {
        None = 0 => "NONE",
        Period = 1 => "PERIOD",
        Mix = 2 => "MIX",
        TapeMetal = 10 => "TAPE_METAL",
        TapeDolby = 11 => "TAPE_DOLBY",
        ModeAmfm = 20 => "MODE_AMFM",
        ModeCd = 21 => "MODE_CD",
        ModeTape = 22 => "MODE_TAPE",
    }
}
