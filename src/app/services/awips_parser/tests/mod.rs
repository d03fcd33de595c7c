//! Test fixtures and helpers for AWIPS parser testing
//!
//! Bulletins here are shaped like live NWWS-OI traffic: sequence number,
//! WMO heading, AWIPS identifier, UGC and VTEC lines, narrative text and a
//! `$$` terminator.

use crate::app::models::WmoHeading;

mod latlon_tests;
mod ugc_tests;

/// A complete, realistic tornado warning bulletin
pub fn sample_tornado_warning() -> String {
    "\
000
WFUS52 KFFC 011558
TORFFC
GAC121-135-011645-
/O.NEW.KFFC.TO.W.0045.240601T1558Z-240601T1645Z/

Tornado Warning

National Weather Service Peachtree City GA
1158 AM EDT Sat Jun 1 2024

The National Weather Service in Peachtree City has issued a

* Tornado Warning for...
  Northwestern Fulton County in north central Georgia...
  Cobb County in north central Georgia...

* Until 1245 PM EDT.

* At 1157 AM EDT, a severe thunderstorm capable of producing a
  tornado was located near Atlanta, moving northeast at 25 mph.

HAIL...1.00IN
WIND...70MPH
TORNADO...RADAR INDICATED

LAT...LON 3378 8445 3390 8430 3381 8410 3370 8428
TIME...MOT...LOC 1557Z 240DEG 22KT 3378 8440

$$
"
    .to_string()
}

/// A heading matching the sample warning (issued day 1, 1558Z)
pub fn sample_wmo() -> WmoHeading {
    WmoHeading {
        raw: "WFUS52 KFFC 011558".to_string(),
        data_type: "WFUS52".to_string(),
        office: "KFFC".to_string(),
        day: 1,
        hour: 15,
        minute: 58,
        bbb: None,
    }
}
