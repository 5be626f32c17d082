//! Facet enumeration for the registry search space
//!
//! The registry's advanced search is driven by four reference lists. The
//! enumerator walks their full cartesian product in a fixed nesting order
//! (province, then asset type, then auction type, then status), yielding one
//! [`Facet`] per search query. Pure data, no side effects.

/// Spanish provinces as listed by the registry
pub const PROVINCES: &[&str] = &[
    "Álava",
    "Albacete",
    "Alicante",
    "Almería",
    "Asturias",
    "Ávila",
    "Badajoz",
    "Baleares",
    "Barcelona",
    "Burgos",
    "Cáceres",
    "Cádiz",
    "Cantabria",
    "Castellón",
    "Ceuta",
    "Ciudad Real",
    "Córdoba",
    "Cuenca",
    "Gerona",
    "Granada",
    "Guadalajara",
    "Guipúzcoa",
    "Huelva",
    "Huesca",
    "Jaén",
    "La Coruña",
    "La Rioja",
    "Las Palmas",
    "León",
    "Lérida",
    "Lugo",
    "Madrid",
    "Málaga",
    "Melilla",
    "Murcia",
    "Navarra",
    "Orense",
    "Palencia",
    "Pontevedra",
    "Salamanca",
    "Santa Cruz de Tenerife",
    "Segovia",
    "Sevilla",
    "Soria",
    "Tarragona",
    "Teruel",
    "Toledo",
    "Valencia",
    "Valladolid",
    "Vizcaya",
    "Zamora",
    "Zaragoza",
];

/// Asset type filter values
pub const ASSET_TYPES: &[&str] = &[
    "Inmuebles - Vivienda",
    "Inmuebles - Local comercial",
    "Inmuebles - Garaje",
    "Inmuebles - Trastero",
    "Inmuebles - Nave industrial",
    "Inmuebles - Solar",
    "Inmuebles - Finca rústica",
    "Inmuebles - Otros",
    "Vehículos - Turismos",
    "Vehículos - Vehículos industriales",
    "Vehículos - Otros",
    "Otros bienes muebles - Aeronaves",
    "Otros bienes muebles - Buques",
    "Otros bienes muebles - Maquinaria",
    "Otros bienes muebles - Joyas, obras de arte",
    "Otros bienes muebles - Mobiliario",
    "Otros bienes muebles - Otros",
];

/// Auction type filter values
pub const AUCTION_TYPES: &[&str] = &[
    "Judicial",
    "Notarial",
    "AEAT",
    "Otras administraciones tributarias",
    "Subastas administrativas generales",
];

/// Auction status filter values
pub const STATUSES: &[&str] = &[
    "Próxima apertura",
    "Celebrándose",
    "Concluida en el portal de subastas",
    "Finalizada por autoridad gestora",
];

/// One (province, asset type, auction type, status) combination defining a
/// single search query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Facet {
    pub province: &'static str,
    pub asset_type: &'static str,
    pub auction_type: &'static str,
    pub status: &'static str,
}

impl std::fmt::Display for Facet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} | {} | {} | {}",
            self.province, self.asset_type, self.auction_type, self.status
        )
    }
}

/// Returns a lazy iterator over the full facet search space
///
/// The sequence is finite, deterministic, and restartable from the start:
/// outer loop province, then asset type, then auction type, then status,
/// matching the reference lists' order.
pub fn facet_space() -> impl Iterator<Item = Facet> {
    PROVINCES.iter().copied().flat_map(|province| {
        ASSET_TYPES.iter().copied().flat_map(move |asset_type| {
            AUCTION_TYPES.iter().copied().flat_map(move |auction_type| {
                STATUSES.iter().copied().map(move |status| Facet {
                    province,
                    asset_type,
                    auction_type,
                    status,
                })
            })
        })
    })
}

/// Total number of facets in the search space
pub fn facet_space_size() -> usize {
    PROVINCES.len() * ASSET_TYPES.len() * AUCTION_TYPES.len() * STATUSES.len()
}
