use phf::{phf_map, Map};
use std::fmt;

use crate::error::{BasisError, Result};

/// One row of the periodic table as the basis-set formats see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Element {
    pub number: u32,
    pub symbol: &'static str,
    /// Upper-case name, the spelling GAMESS-US uses as a block title
    pub name: &'static str,
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

// indexed by atomic number - 1
const ELEMENTS: [(&str, &str); 118] = [
    ("H", "HYDROGEN"), ("He", "HELIUM"), ("Li", "LITHIUM"), ("Be", "BERYLLIUM"),
    ("B", "BORON"), ("C", "CARBON"), ("N", "NITROGEN"), ("O", "OXYGEN"),
    ("F", "FLUORINE"), ("Ne", "NEON"), ("Na", "SODIUM"), ("Mg", "MAGNESIUM"),
    ("Al", "ALUMINUM"), ("Si", "SILICON"), ("P", "PHOSPHORUS"), ("S", "SULFUR"),
    ("Cl", "CHLORINE"), ("Ar", "ARGON"), ("K", "POTASSIUM"), ("Ca", "CALCIUM"),
    ("Sc", "SCANDIUM"), ("Ti", "TITANIUM"), ("V", "VANADIUM"), ("Cr", "CHROMIUM"),
    ("Mn", "MANGANESE"), ("Fe", "IRON"), ("Co", "COBALT"), ("Ni", "NICKEL"),
    ("Cu", "COPPER"), ("Zn", "ZINC"), ("Ga", "GALLIUM"), ("Ge", "GERMANIUM"),
    ("As", "ARSENIC"), ("Se", "SELENIUM"), ("Br", "BROMINE"), ("Kr", "KRYPTON"),
    ("Rb", "RUBIDIUM"), ("Sr", "STRONTIUM"), ("Y", "YTTRIUM"), ("Zr", "ZIRCONIUM"),
    ("Nb", "NIOBIUM"), ("Mo", "MOLYBDENUM"), ("Tc", "TECHNETIUM"), ("Ru", "RUTHENIUM"),
    ("Rh", "RHODIUM"), ("Pd", "PALLADIUM"), ("Ag", "SILVER"), ("Cd", "CADMIUM"),
    ("In", "INDIUM"), ("Sn", "TIN"), ("Sb", "ANTIMONY"), ("Te", "TELLURIUM"),
    ("I", "IODINE"), ("Xe", "XENON"), ("Cs", "CESIUM"), ("Ba", "BARIUM"),
    ("La", "LANTHANUM"), ("Ce", "CERIUM"), ("Pr", "PRASEODYMIUM"), ("Nd", "NEODYMIUM"),
    ("Pm", "PROMETHIUM"), ("Sm", "SAMARIUM"), ("Eu", "EUROPIUM"), ("Gd", "GADOLINIUM"),
    ("Tb", "TERBIUM"), ("Dy", "DYSPROSIUM"), ("Ho", "HOLMIUM"), ("Er", "ERBIUM"),
    ("Tm", "THULIUM"), ("Yb", "YTTERBIUM"), ("Lu", "LUTETIUM"), ("Hf", "HAFNIUM"),
    ("Ta", "TANTALUM"), ("W", "TUNGSTEN"), ("Re", "RHENIUM"), ("Os", "OSMIUM"),
    ("Ir", "IRIDIUM"), ("Pt", "PLATINUM"), ("Au", "GOLD"), ("Hg", "MERCURY"),
    ("Tl", "THALLIUM"), ("Pb", "LEAD"), ("Bi", "BISMUTH"), ("Po", "POLONIUM"),
    ("At", "ASTATINE"), ("Rn", "RADON"), ("Fr", "FRANCIUM"), ("Ra", "RADIUM"),
    ("Ac", "ACTINIUM"), ("Th", "THORIUM"), ("Pa", "PROTACTINIUM"), ("U", "URANIUM"),
    ("Np", "NEPTUNIUM"), ("Pu", "PLUTONIUM"), ("Am", "AMERICIUM"), ("Cm", "CURIUM"),
    ("Bk", "BERKELIUM"), ("Cf", "CALIFORNIUM"), ("Es", "EINSTEINIUM"), ("Fm", "FERMIUM"),
    ("Md", "MENDELEVIUM"), ("No", "NOBELIUM"), ("Lr", "LAWRENCIUM"), ("Rf", "RUTHERFORDIUM"),
    ("Db", "DUBNIUM"), ("Sg", "SEABORGIUM"), ("Bh", "BOHRIUM"), ("Hs", "HASSIUM"),
    ("Mt", "MEITNERIUM"), ("Ds", "DARMSTADTIUM"), ("Rg", "ROENTGENIUM"), ("Cn", "COPERNICIUM"),
    ("Uut", "UNUNTRIUM"), ("Fl", "FLEROVIUM"), ("Uup", "UNUNPENTIUM"), ("Lv", "LIVERMORIUM"),
    ("Uus", "UNUNSEPTIUM"), ("Uuo", "UNUNOCTIUM"),
];

/// Lower-case symbol to atomic number
pub static ATOMIC_NUMBER_MAP: Map<&'static str, u32> = phf_map! {
    "h" => 1, "he" => 2, "li" => 3, "be" => 4, "b" => 5, "c" => 6, "n" => 7, "o" => 8,
    "f" => 9, "ne" => 10, "na" => 11, "mg" => 12, "al" => 13, "si" => 14, "p" => 15,
    "s" => 16, "cl" => 17, "ar" => 18, "k" => 19, "ca" => 20, "sc" => 21, "ti" => 22,
    "v" => 23, "cr" => 24, "mn" => 25, "fe" => 26, "co" => 27, "ni" => 28, "cu" => 29,
    "zn" => 30, "ga" => 31, "ge" => 32, "as" => 33, "se" => 34, "br" => 35, "kr" => 36,
    "rb" => 37, "sr" => 38, "y" => 39, "zr" => 40, "nb" => 41, "mo" => 42, "tc" => 43,
    "ru" => 44, "rh" => 45, "pd" => 46, "ag" => 47, "cd" => 48, "in" => 49, "sn" => 50,
    "sb" => 51, "te" => 52, "i" => 53, "xe" => 54, "cs" => 55, "ba" => 56, "la" => 57,
    "ce" => 58, "pr" => 59, "nd" => 60, "pm" => 61, "sm" => 62, "eu" => 63, "gd" => 64,
    "tb" => 65, "dy" => 66, "ho" => 67, "er" => 68, "tm" => 69, "yb" => 70, "lu" => 71,
    "hf" => 72, "ta" => 73, "w" => 74, "re" => 75, "os" => 76, "ir" => 77, "pt" => 78,
    "au" => 79, "hg" => 80, "tl" => 81, "pb" => 82, "bi" => 83, "po" => 84, "at" => 85,
    "rn" => 86, "fr" => 87, "ra" => 88, "ac" => 89, "th" => 90, "pa" => 91, "u" => 92,
    "np" => 93, "pu" => 94, "am" => 95, "cm" => 96, "bk" => 97, "cf" => 98, "es" => 99,
    "fm" => 100, "md" => 101, "no" => 102, "lr" => 103, "rf" => 104, "db" => 105,
    "sg" => 106, "bh" => 107, "hs" => 108, "mt" => 109, "ds" => 110, "rg" => 111,
    "cn" => 112, "uut" => 113, "fl" => 114, "uup" => 115, "lv" => 116, "uus" => 117,
    "uuo" => 118,
};

/// Spellings seen in the wild that differ from the table's names
static NAME_ALIASES: Map<&'static str, u32> = phf_map! {
    "SULPHUR" => 16,
    "ALUMINIUM" => 13,
    "CAESIUM" => 55,
    "PHOSPHOROUS" => 15,
};

pub fn element_by_number(atomic_number: u32) -> Result<Element> {
    let index = (atomic_number as usize)
        .checked_sub(1)
        .filter(|i| *i < ELEMENTS.len())
        .ok_or_else(|| BasisError::UnknownElement(atomic_number.to_string()))?;
    let (symbol, name) = ELEMENTS[index];
    Ok(Element {
        number: atomic_number,
        symbol,
        name,
    })
}

pub fn element_by_symbol(symbol: &str) -> Result<Element> {
    let number = atomic_number_of(symbol)?;
    element_by_number(number)
}

/// Look an element up by its full name, e.g. "chlorine" or "CHLORINE".
pub fn element_by_name(name: &str) -> Result<Element> {
    let upper = name.trim().to_uppercase();
    if let Some(index) = ELEMENTS.iter().position(|(_, n)| *n == upper) {
        return element_by_number(index as u32 + 1);
    }
    match NAME_ALIASES.get(upper.as_str()) {
        Some(number) => element_by_number(*number),
        None => Err(BasisError::UnknownElement(name.trim().to_string())),
    }
}

pub fn symbol_of(atomic_number: u32) -> Result<&'static str> {
    element_by_number(atomic_number).map(|e| e.symbol)
}

pub fn name_of(atomic_number: u32) -> Result<&'static str> {
    element_by_number(atomic_number).map(|e| e.name)
}

pub fn atomic_number_of(symbol: &str) -> Result<u32> {
    ATOMIC_NUMBER_MAP
        .get(symbol.trim().to_lowercase().as_str())
        .copied()
        .ok_or_else(|| BasisError::UnknownElement(symbol.trim().to_string()))
}

/// Iterate over every known element in atomic-number order.
pub fn elements() -> impl Iterator<Item = Element> {
    ELEMENTS
        .iter()
        .enumerate()
        .map(|(i, (symbol, name))| Element {
            number: i as u32 + 1,
            symbol,
            name,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_both_directions() {
        assert_eq!(symbol_of(3).unwrap(), "Li");
        assert_eq!(name_of(3).unwrap(), "LITHIUM");
        assert_eq!(atomic_number_of("Li").unwrap(), 3);
        assert_eq!(atomic_number_of("lI").unwrap(), 3);
        assert_eq!(atomic_number_of(" CL ").unwrap(), 17);
    }

    #[test]
    fn unknown_elements() {
        assert_eq!(
            atomic_number_of("Xx"),
            Err(BasisError::UnknownElement("Xx".to_string()))
        );
        assert!(symbol_of(0).is_err());
        assert!(name_of(119).is_err());
    }

    #[test]
    fn symbol_table_is_bijective() {
        assert_eq!(ATOMIC_NUMBER_MAP.len(), 118);
        for element in elements() {
            assert_eq!(atomic_number_of(element.symbol).unwrap(), element.number);
        }
    }

    #[test]
    fn names_and_aliases() {
        assert_eq!(element_by_name("helium").unwrap().symbol, "He");
        assert_eq!(element_by_name("SULPHUR").unwrap().symbol, "S");
        assert_eq!(element_by_name("Ununtrium").unwrap().number, 113);
        assert!(element_by_name("KRYPTONITE").is_err());
    }
}
