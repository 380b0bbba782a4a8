//! Macros for typed domain states.

/// Generate a domain state enum implementing [`State`](crate::core::State)
/// and converting into [`StateName`](crate::core::StateName).
///
/// Variants use their own identifier as state name unless a string label is
/// given.
///
/// # Example
///
/// ```
/// use guardwire::builder::StateBuilder;
/// use guardwire::core::{State, StateName};
/// use guardwire::state_enum;
///
/// state_enum! {
///     pub enum Bulb {
///         Unlit = "unlit",
///         Lit = "lit",
///         Broken = "broken",
///     }
///     final: [Broken]
/// }
///
/// assert_eq!(Bulb::Lit.name(), "lit");
/// assert!(Bulb::Broken.is_final());
/// assert_eq!(StateName::from(Bulb::Unlit), StateName::new("unlit"));
///
/// let unlit = StateBuilder::new(Bulb::Unlit).on("TOGGLE", Bulb::Lit);
///
/// let (_, broken) = StateBuilder::for_state(&Bulb::Broken).build().unwrap();
/// assert!(broken.final_state);
/// ```
#[macro_export]
macro_rules! state_enum {
    (@name $variant:ident) => {
        stringify!($variant)
    };
    (@name $variant:ident $label:literal) => {
        $label
    };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $(= $label:literal)?
            ),* $(,)?
        }

        $(final: [$($final:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => $crate::state_enum!(@name $variant $($label)?)),*
                }
            }

            fn is_final(&self) -> bool {
                match self {
                    $($(Self::$final => true,)*)?
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }
        }

        impl ::std::convert::From<$name> for $crate::core::StateName {
            fn from(state: $name) -> Self {
                $crate::core::StateName::new($crate::core::State::name(&state))
            }
        }

        impl ::std::convert::From<&$name> for $crate::core::StateName {
            fn from(state: &$name) -> Self {
                $crate::core::StateName::new($crate::core::State::name(state))
            }
        }
    };
}
