//! Keyword table for the truck file format.
//!
//! Every keyword is declared once in the `keywords!` table below; the enum,
//! its canonical spelling and its line shape are all generated from it so
//! they cannot drift apart. Identification is a single hash lookup keyed by
//! the leading token of a line: first by exact spelling, then by the
//! ASCII-lowercased spelling.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// How a keyword appears on its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordShape {
    /// Alone on the line (`nodes`, `end`, `rollon`).
    Block,
    /// Followed by arguments on the same line (`set_beam_defaults 1 2 3`).
    Inline,
}

macro_rules! keywords {
    ($( $variant:ident => ($text:literal, $shape:ident) ),+ $(,)?) => {
        /// A recognised keyword, or `Invalid` for data lines.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum Keyword {
            Invalid,
            $( $variant, )+
        }

        impl Keyword {
            /// Every real keyword, in table order.
            pub const ALL: &'static [Keyword] = &[ $( Keyword::$variant, )+ ];

            /// Canonical spelling as written in well-formed files.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    Keyword::Invalid => "",
                    $( Keyword::$variant => $text, )+
                }
            }

            #[must_use]
            pub const fn shape(self) -> KeywordShape {
                match self {
                    Keyword::Invalid => KeywordShape::Block,
                    $( Keyword::$variant => KeywordShape::$shape, )+
                }
            }
        }
    };
}

keywords! {
    AddAnimation              => ("add_animation", Inline),
    Airbrakes                 => ("airbrakes", Block),
    Animators                 => ("animators", Block),
    AntiLockBrakes            => ("AntiLockBrakes", Inline),
    Axles                     => ("axles", Block),
    Author                    => ("author", Inline),
    Backmesh                  => ("backmesh", Block),
    Beams                     => ("beams", Block),
    Brakes                    => ("brakes", Block),
    Cab                       => ("cab", Block),
    Camerarail                => ("camerarail", Block),
    Cameras                   => ("cameras", Block),
    Cinecam                   => ("cinecam", Block),
    Collisionboxes            => ("collisionboxes", Block),
    Commands                  => ("commands", Block),
    Commands2                 => ("commands2", Block),
    Comment                   => ("comment", Block),
    Contacters                => ("contacters", Block),
    CruiseControl             => ("cruisecontrol", Inline),
    Description               => ("description", Block),
    DetacherGroup             => ("detacher_group", Inline),
    DisableDefaultSounds      => ("disabledefaultsounds", Block),
    EnableAdvancedDeformation => ("enable_advanced_deformation", Block),
    End                       => ("end", Block),
    EndComment                => ("end_comment", Block),
    EndDescription            => ("end_description", Block),
    EndSection                => ("end_section", Block),
    Engine                    => ("engine", Block),
    Engoption                 => ("engoption", Block),
    Engturbo                  => ("engturbo", Block),
    Envmap                    => ("envmap", Block),
    Exhausts                  => ("exhausts", Block),
    ExtCamera                 => ("extcamera", Inline),
    FileFormatVersion         => ("fileformatversion", Inline),
    FileInfo                  => ("fileinfo", Inline),
    Fixes                     => ("fixes", Block),
    Flares                    => ("flares", Block),
    Flares2                   => ("flares2", Block),
    Flares3                   => ("flares3", Block),
    Flexbodies                => ("flexbodies", Block),
    FlexbodyCameraMode        => ("flexbody_camera_mode", Inline),
    Flexbodywheels            => ("flexbodywheels", Block),
    Forset                    => ("forset", Inline),
    ForwardCommands           => ("forwardcommands", Block),
    Fusedrag                  => ("fusedrag", Block),
    Globals                   => ("globals", Block),
    Guid                      => ("guid", Inline),
    GuiSettings               => ("guisettings", Block),
    Help                      => ("help", Block),
    HideInChooser             => ("hideInChooser", Block),
    Hookgroup                 => ("hookgroup", Block),
    Hooks                     => ("hooks", Block),
    Hydros                    => ("hydros", Block),
    ImportCommands            => ("importcommands", Block),
    Interaxles                => ("interaxles", Block),
    Lockgroups                => ("lockgroups", Block),
    LockgroupDefaultNolock    => ("lockgroup_default_nolock", Block),
    ManagedMaterials          => ("managedmaterials", Block),
    MaterialFlareBindings     => ("materialflarebindings", Block),
    Meshwheels                => ("meshwheels", Block),
    Meshwheels2               => ("meshwheels2", Block),
    Minimass                  => ("minimass", Block),
    NodeCollision             => ("nodecollision", Block),
    Nodes                     => ("nodes", Block),
    Nodes2                    => ("nodes2", Block),
    Particles                 => ("particles", Block),
    Pistonprops               => ("pistonprops", Block),
    PropCameraMode            => ("prop_camera_mode", Inline),
    Props                     => ("props", Block),
    Railgroups                => ("railgroups", Block),
    Rescuer                   => ("rescuer", Block),
    Rigidifiers               => ("rigidifiers", Block),
    Rollon                    => ("rollon", Block),
    Ropables                  => ("ropables", Block),
    Ropes                     => ("ropes", Block),
    Rotators                  => ("rotators", Block),
    Rotators2                 => ("rotators2", Block),
    Screwprops                => ("screwprops", Block),
    Section                   => ("section", Inline),
    SectionConfig             => ("sectionconfig", Inline),
    SetBeamDefaults           => ("set_beam_defaults", Inline),
    SetBeamDefaultsScale      => ("set_beam_defaults_scale", Inline),
    SetCollisionRange         => ("set_collision_range", Inline),
    SetDefaultMinimass        => ("set_default_minimass", Inline),
    SetInertiaDefaults        => ("set_inertia_defaults", Inline),
    SetManagedMaterialsOptions => ("set_managedmaterials_options", Inline),
    SetNodeDefaults           => ("set_node_defaults", Inline),
    SetShadows                => ("set_shadows", Inline),
    SetSkeletonSettings       => ("set_skeleton_settings", Inline),
    Shocks                    => ("shocks", Block),
    Shocks2                   => ("shocks2", Block),
    Shocks3                   => ("shocks3", Block),
    SlidenodeConnectInstantly => ("slidenode_connect_instantly", Block),
    Slidenodes                => ("slidenodes", Block),
    SlopeBrake                => ("SlopeBrake", Inline),
    Soundsources              => ("soundsources", Block),
    Soundsources2             => ("soundsources2", Block),
    SpeedLimiter              => ("speedlimiter", Inline),
    Submesh                   => ("submesh", Block),
    SubmeshGroundmodel        => ("submesh_groundmodel", Inline),
    Texcoords                 => ("texcoords", Block),
    Ties                      => ("ties", Block),
    Torquecurve               => ("torquecurve", Block),
    TractionControl           => ("TractionControl", Inline),
    Transfercase              => ("transfercase", Block),
    Triggers                  => ("triggers", Block),
    Turbojets                 => ("turbojets", Block),
    Turboprops                => ("turboprops", Block),
    Turboprops2               => ("turboprops2", Block),
    Videocamera               => ("videocamera", Block),
    Wheeldetachers            => ("wheeldetachers", Block),
    Wheels                    => ("wheels", Block),
    Wheels2                   => ("wheels2", Block),
    Wings                     => ("wings", Block),
}

/// Longest canonical spelling; tokens longer than this are never keywords.
const MAX_KEYWORD_LEN: usize = 32;

static EXACT: LazyLock<HashMap<&'static str, Keyword>> =
    LazyLock::new(|| Keyword::ALL.iter().map(|k| (k.as_str(), *k)).collect());

static LOWERCASE: LazyLock<HashMap<String, Keyword>> = LazyLock::new(|| {
    Keyword::ALL
        .iter()
        .map(|k| (k.as_str().to_ascii_lowercase(), *k))
        .collect()
});

/// Result of keyword identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identified {
    pub keyword: Keyword,
    /// `false` when only the case-insensitive pass matched.
    pub exact_case: bool,
}

impl Keyword {
    /// Directives without arguments that only toggle a document-wide flag.
    #[must_use]
    pub const fn is_flag_directive(self) -> bool {
        matches!(
            self,
            Keyword::DisableDefaultSounds
                | Keyword::EnableAdvancedDeformation
                | Keyword::ForwardCommands
                | Keyword::HideInChooser
                | Keyword::ImportCommands
                | Keyword::LockgroupDefaultNolock
                | Keyword::Rescuer
                | Keyword::Rollon
                | Keyword::SlidenodeConnectInstantly
        )
    }

    /// Keywords accepted for compatibility but otherwise ignored.
    #[must_use]
    pub const fn is_obsolete(self) -> bool {
        matches!(
            self,
            Keyword::Envmap | Keyword::Hookgroup | Keyword::NodeCollision | Keyword::Rigidifiers
        )
    }

    /// Inline directives handled on the spot; they never change the current block.
    #[must_use]
    pub const fn is_inline_directive(self) -> bool {
        matches!(
            self,
            Keyword::AddAnimation
                | Keyword::AntiLockBrakes
                | Keyword::Author
                | Keyword::Backmesh
                | Keyword::CruiseControl
                | Keyword::DetacherGroup
                | Keyword::ExtCamera
                | Keyword::FileFormatVersion
                | Keyword::FileInfo
                | Keyword::FlexbodyCameraMode
                | Keyword::Forset
                | Keyword::Guid
                | Keyword::PropCameraMode
                | Keyword::Section
                | Keyword::SectionConfig
                | Keyword::SetBeamDefaults
                | Keyword::SetBeamDefaultsScale
                | Keyword::SetCollisionRange
                | Keyword::SetDefaultMinimass
                | Keyword::SetInertiaDefaults
                | Keyword::SetManagedMaterialsOptions
                | Keyword::SetNodeDefaults
                | Keyword::SetShadows
                | Keyword::SetSkeletonSettings
                | Keyword::SlopeBrake
                | Keyword::SpeedLimiter
                | Keyword::SubmeshGroundmodel
                | Keyword::TractionControl
        )
    }

    /// Block terminators.
    #[must_use]
    pub const fn is_terminator(self) -> bool {
        matches!(
            self,
            Keyword::End | Keyword::EndComment | Keyword::EndDescription
        )
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Keyword::Invalid => f.write_str("<none>"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Identify the keyword on a line, or `Keyword::Invalid` for data lines.
#[must_use]
pub fn identify(line: &str) -> Keyword {
    identify_with_case(line).map_or(Keyword::Invalid, |id| id.keyword)
}

/// Identify the keyword on a line and report whether its lettercase was canonical.
///
/// Block keywords only match when nothing but separators follows them, so a
/// data line whose first field happens to spell a keyword is left alone.
#[must_use]
pub fn identify_with_case(line: &str) -> Option<Identified> {
    let line = line.trim_start_matches([' ', '\t']);
    let token_len = line
        .bytes()
        .position(crate::tokenizer::is_separator)
        .unwrap_or(line.len());
    let token = &line[..token_len];
    if token.is_empty()
        || token.len() > MAX_KEYWORD_LEN
        || !token.as_bytes()[0].is_ascii_alphabetic()
    {
        return None;
    }

    let (keyword, exact_case) = match EXACT.get(token) {
        Some(k) => (*k, true),
        None => {
            let mut buf = [0u8; MAX_KEYWORD_LEN];
            let lower = &mut buf[..token.len()];
            lower.copy_from_slice(token.as_bytes());
            lower.make_ascii_lowercase();
            let lower = std::str::from_utf8(lower).ok()?;
            (*LOWERCASE.get(lower)?, false)
        }
    };

    let rest = &line[token_len..];
    if keyword.shape() == KeywordShape::Block
        && !rest.bytes().all(crate::tokenizer::is_separator)
    {
        return None;
    }
    Some(Identified { keyword, exact_case })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifies_block_keywords() {
        assert_eq!(identify("nodes"), Keyword::Nodes);
        assert_eq!(identify("nodes2  "), Keyword::Nodes2);
        assert_eq!(identify("  beams"), Keyword::Beams);
        assert_eq!(identify("end"), Keyword::End);
        assert_eq!(identify("end_section"), Keyword::EndSection);
    }

    #[test]
    fn identifies_inline_keywords_with_arguments() {
        assert_eq!(identify("set_beam_defaults 1, 2, 3"), Keyword::SetBeamDefaults);
        assert_eq!(
            identify("set_beam_defaults_scale 1, 2"),
            Keyword::SetBeamDefaultsScale
        );
        assert_eq!(identify("add_animation, 1, 2, 3"), Keyword::AddAnimation);
        assert_eq!(identify("section 1 alt"), Keyword::Section);
    }

    #[test]
    fn block_keyword_followed_by_data_is_not_a_keyword() {
        assert_eq!(identify("wheels 1 2 3"), Keyword::Invalid);
    }

    #[test]
    fn data_lines_are_invalid() {
        assert_eq!(identify("1, 0.0, 0.0, 0.0"), Keyword::Invalid);
        assert_eq!(identify("n1 n2 s 12.5"), Keyword::Invalid);
        assert_eq!(identify(""), Keyword::Invalid);
    }

    #[test]
    fn case_insensitive_fallback_flags_lettercase() {
        let exact = identify_with_case("hideInChooser").expect("keyword");
        assert!(exact.exact_case);
        let loose = identify_with_case("HIDEINCHOOSER").expect("keyword");
        assert_eq!(loose.keyword, Keyword::HideInChooser);
        assert!(!loose.exact_case);
        let tc = identify_with_case("tractioncontrol 1, 2").expect("keyword");
        assert_eq!(tc.keyword, Keyword::TractionControl);
        assert!(!tc.exact_case);
    }

    #[test]
    fn canonical_spelling_round_trips() {
        for kw in Keyword::ALL {
            let found = identify_with_case(kw.as_str()).map(|i| i.keyword);
            if kw.shape() == KeywordShape::Block {
                assert_eq!(found, Some(*kw), "{kw:?}");
            }
        }
    }

    #[test]
    fn classification_is_disjoint() {
        for kw in Keyword::ALL {
            let roles = [
                kw.is_flag_directive(),
                kw.is_obsolete(),
                kw.is_inline_directive(),
                kw.is_terminator(),
            ];
            assert!(roles.iter().filter(|r| **r).count() <= 1, "{kw:?}");
        }
    }
}
