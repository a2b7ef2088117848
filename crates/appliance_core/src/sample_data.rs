//! The demo collection shown to users with nothing stored yet.
//!
//! All dates are relative to the `now` passed in, so the mix of statuses
//! (active, expiring soon, expired, overdue, upcoming, completed) is the same
//! whenever the set is generated. Only the ids differ between calls.

use appliance_common::models::{
    Appliance, Frequency, LinkedDocument, MaintenanceTask, ServiceProvider, SupportContact,
};
use appliance_common::models::Frequency::{Monthly, Yearly};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::status::sub_calendar_months;

struct SampleContact {
    name: &'static str,
    company: &'static str,
    phone: &'static str,
    email: Option<&'static str>,
    website: &'static str,
}

struct SampleProvider {
    name: &'static str,
    phone: &'static str,
    email: Option<&'static str>,
}

struct SampleTask {
    name: &'static str,
    offset_days: i64,
    frequency: Frequency,
    completed: bool,
    notes: Option<&'static str>,
    provider: Option<SampleProvider>,
}

struct SampleAppliance {
    name: &'static str,
    brand: &'static str,
    model: &'static str,
    age_months: u32,
    warranty_months: u32,
    serial: &'static str,
    location: &'static str,
    notes: &'static str,
    contact: SampleContact,
    tasks: [SampleTask; 3],
    documents: &'static [(&'static str, &'static str)],
}

const fn task(
    name: &'static str,
    offset_days: i64,
    frequency: Frequency,
    completed: bool,
    notes: Option<&'static str>,
) -> SampleTask {
    SampleTask {
        name,
        offset_days,
        frequency,
        completed,
        notes,
        provider: None,
    }
}

const fn contact(
    name: &'static str,
    company: &'static str,
    phone: &'static str,
    email: Option<&'static str>,
    website: &'static str,
) -> SampleContact {
    SampleContact {
        name,
        company,
        phone,
        email,
        website,
    }
}

const SAMPLES: [SampleAppliance; 22] = [
    SampleAppliance {
        name: "Whirlpool Dryer",
        brand: "Whirlpool",
        model: "WED5620HW",
        age_months: 23,
        warranty_months: 24,
        serial: "WHIR-DR-001",
        location: "Home Depot",
        notes: "Stackable dryer with steam refresh cycle",
        contact: contact(
            "Whirlpool Customer Service",
            "Whirlpool Corporation",
            "1-866-698-2538",
            Some("customerservice@whirlpool.com"),
            "https://www.whirlpool.com/services/contact-us.html",
        ),
        tasks: [
            task("Clean lint trap and exhaust vent", -10, Monthly, false, Some("Check for blockages")),
            task("Professional duct cleaning", 14, Yearly, false, Some("Schedule with HVAC service")),
            task("Drum cleaning cycle", -30, Monthly, true, Some("Use dryer cleaning kit")),
        ],
        documents: &[
            (
                "User Manual",
                "https://www.whirlpool.com/content/dam/global/documents/201706/user-instructions-W10751102-A.pdf",
            ),
            ("Purchase Receipt", "https://example.com/receipts/whirlpool-dryer"),
        ],
    },
    SampleAppliance {
        name: "Bosch Dishwasher",
        brand: "Bosch",
        model: "SHXM4AY55N",
        age_months: 36,
        warranty_months: 12,
        serial: "BOSCH-DW-002",
        location: "Lowe's",
        notes: "Third rack design with adjustable tines",
        contact: contact(
            "Bosch Customer Care",
            "BSH Home Appliances",
            "1-800-944-2904",
            Some("support@bsh-group.com"),
            "https://www.bosch-home.com/us/service",
        ),
        tasks: [
            task("Clean dishwasher filter", -5, Monthly, false, Some("Remove and rinse filter")),
            task("Run cleaning cycle with cleaner", 7, Monthly, false, None),
            task("Check spray arms for clogs", -45, Monthly, true, None),
        ],
        documents: &[(
            "Installation Guide",
            "https://www.bosch-home.com/us/service/installation",
        )],
    },
    SampleAppliance {
        name: "Samsung 55\" QLED TV",
        brand: "Samsung",
        model: "QN55Q80C",
        age_months: 2,
        warranty_months: 36,
        serial: "SAM-TV-003",
        location: "Best Buy",
        notes: "Quantum HDR 24x with Direct Full Array backlighting",
        contact: contact(
            "Samsung Support",
            "Samsung Electronics",
            "1-800-SAMSUNG",
            Some("support@samsung.com"),
            "https://www.samsung.com/us/support/",
        ),
        tasks: [
            task("Dust screen and vents", -15, Monthly, true, Some("Use microfiber cloth")),
            task("Software update check", 30, Monthly, false, None),
            task("Clean remote control", 45, Monthly, false, None),
        ],
        documents: &[
            ("TV Receipt", "https://example.com/receipts/samsung-tv"),
            (
                "Warranty Information",
                "https://www.samsung.com/us/support/warranty/",
            ),
        ],
    },
    SampleAppliance {
        name: "LG French Door Refrigerator",
        brand: "LG",
        model: "LRFVS3006S",
        age_months: 8,
        warranty_months: 24,
        serial: "LG-REF-004",
        location: "Costco",
        notes: "InstaView Door-in-Door with craft ice maker",
        contact: contact(
            "LG Customer Service",
            "LG Electronics",
            "1-800-243-0000",
            Some("lgecs@lge.com"),
            "https://www.lg.com/us/support",
        ),
        tasks: [
            SampleTask {
                name: "Replace water filter",
                offset_days: 5,
                frequency: Monthly,
                completed: false,
                notes: Some("Model LT1000P filter"),
                provider: Some(SampleProvider {
                    name: "Appliance Service Co",
                    phone: "555-123-4567",
                    email: None,
                }),
            },
            task("Clean coils and vents", 90, Yearly, false, None),
            task("Ice maker cleaning", -60, Monthly, true, Some("Used LG cleaning solution")),
        ],
        documents: &[(
            "User Manual",
            "https://www.lg.com/us/support/product/lg-LRFVS3006S",
        )],
    },
    SampleAppliance {
        name: "GE Top Load Washer",
        brand: "GE",
        model: "GTW465ASNWW",
        age_months: 24,
        warranty_months: 12,
        serial: "GE-WM-005",
        location: "Home Depot",
        notes: "Deep fill option with stainless steel basket",
        contact: contact(
            "GE Appliances Service",
            "GE Appliances",
            "1-800-432-2737",
            None,
            "https://www.geappliances.com/service",
        ),
        tasks: [
            task("Run cleaning cycle", -3, Monthly, false, Some("Use Tide Washing Machine Cleaner")),
            task("Check hoses for wear", 180, Yearly, false, None),
            task("Clean lint filter", -20, Monthly, true, None),
        ],
        documents: &[],
    },
    SampleAppliance {
        name: "KitchenAid Stand Mixer",
        brand: "KitchenAid",
        model: "KSM150PSER",
        age_months: 4,
        warranty_months: 12,
        serial: "KA-MX-006",
        location: "Williams Sonoma",
        notes: "Empire Red Artisan Series with tilt-head design",
        contact: contact(
            "KitchenAid Customer Service",
            "Whirlpool Corporation",
            "1-800-541-6390",
            None,
            "https://www.kitchenaid.com/customer-service",
        ),
        tasks: [
            task("Deep clean mixer head and bowl", 20, Monthly, false, None),
            task("Oil gearbox", 365, Yearly, false, Some("Professional service recommended")),
            task("Inspect attachments", -10, Monthly, true, None),
        ],
        documents: &[("Recipe Book", "https://www.kitchenaid.com/recipes")],
    },
    SampleAppliance {
        name: "Dyson V15 Detect",
        brand: "Dyson",
        model: "V15 Detect Absolute",
        age_months: 23,
        warranty_months: 24,
        serial: "DY-VAC-007",
        location: "Target",
        notes: "Laser dust detection with LCD screen",
        contact: contact(
            "Dyson Customer Service",
            "Dyson Inc.",
            "1-844-396-7968",
            None,
            "https://www.dyson.com/support",
        ),
        tasks: [
            task("Empty dust bin and clean filter", -2, Monthly, false, None),
            task("Check brush bar for tangles", 15, Monthly, false, None),
            task("Wash filter", -25, Monthly, true, Some("Allowed to dry for 24 hours")),
        ],
        documents: &[(
            "User Guide",
            "https://www.dyson.com/support/journey/overview/988586-01",
        )],
    },
    SampleAppliance {
        name: "Google Nest Learning Thermostat",
        brand: "Google",
        model: "T3007ES",
        age_months: 6,
        warranty_months: 24,
        serial: "NEST-TH-008",
        location: "Google Store",
        notes: "Third generation with auto-schedule and energy history",
        contact: contact(
            "Nest Support",
            "Google LLC",
            "1-855-469-6378",
            None,
            "https://support.google.com/googlenest",
        ),
        tasks: [
            task("Software update check", 30, Monthly, false, None),
            task("Clean display and sensors", 90, Monthly, false, None),
            task("Check WiFi connectivity", -40, Monthly, true, None),
        ],
        documents: &[],
    },
    SampleAppliance {
        name: "Instant Pot Duo",
        brand: "Instant Pot",
        model: "DUO60",
        age_months: 36,
        warranty_months: 12,
        serial: "IP-POT-009",
        location: "Amazon",
        notes: "6-quart 7-in-1 multi-use pressure cooker",
        contact: contact(
            "Instant Pot Support",
            "Instant Brands",
            "1-800-828-7280",
            None,
            "https://instantpot.com/support/",
        ),
        tasks: [
            task("Deep clean sealing ring", -8, Monthly, false, Some("Check for odors and stains")),
            task("Inspect steam release valve", 25, Monthly, false, None),
            task("Clean float valve", -35, Monthly, true, None),
        ],
        documents: &[("Recipe App", "https://instantpot.com/instantpot-app/")],
    },
    SampleAppliance {
        name: "Breville Barista Express",
        brand: "Breville",
        model: "BES870XL",
        age_months: 3,
        warranty_months: 24,
        serial: "BRV-ESP-010",
        location: "Crate & Barrel",
        notes: "Built-in conical burr grinder with dose control",
        contact: contact(
            "Breville Customer Service",
            "Breville USA",
            "1-866-273-8455",
            None,
            "https://www.breville.com/us/en/support.html",
        ),
        tasks: [
            SampleTask {
                name: "Descale machine",
                offset_days: 10,
                frequency: Monthly,
                completed: false,
                notes: Some("Use Breville descaling solution"),
                provider: Some(SampleProvider {
                    name: "Coffee Equipment Service",
                    phone: "555-987-6543",
                    email: Some("service@coffeeequip.com"),
                }),
            },
            task("Clean grinder burrs", 60, Monthly, false, None),
            task("Backflush group head", -5, Monthly, true, Some("Used Cafiza cleaning powder")),
        ],
        documents: &[(
            "Operating Manual",
            "https://www.breville.com/content/dam/breville/country-sites/global/instruction-booklet/espresso/bes870xl_ib_b17.pdf",
        )],
    },
    SampleAppliance {
        name: "Vitamix 5200",
        brand: "Vitamix",
        model: "5200 Standard",
        age_months: 84,
        warranty_months: 84,
        serial: "VIT-BL-011",
        location: "Vitamix.com",
        notes: "2-peak horsepower motor with 7-year warranty",
        contact: contact(
            "Vitamix Customer Service",
            "Vitamix Corporation",
            "1-800-848-2649",
            None,
            "https://www.vitamix.com/us/en_us/customer-service",
        ),
        tasks: [
            task("Deep clean blades and container", 12, Monthly, false, None),
            task("Check motor base ventilation", 180, Yearly, false, None),
            task("Lubricate drive socket", -90, Yearly, true, Some("Professional service completed")),
        ],
        documents: &[(
            "Getting Started Guide",
            "https://www.vitamix.com/us/en_us/learn/getting-started",
        )],
    },
    SampleAppliance {
        name: "Ninja Foodi Air Fryer",
        brand: "Ninja",
        model: "AF101",
        age_months: 5,
        warranty_months: 12,
        serial: "NJ-AF-012",
        location: "Bed Bath & Beyond",
        notes: "4-quart capacity with crisp plate",
        contact: contact(
            "Ninja Customer Service",
            "SharkNinja",
            "1-877-646-5288",
            None,
            "https://www.ninjakitchen.com/support/",
        ),
        tasks: [
            task("Clean basket and crisper plate", -1, Monthly, false, None),
            task("Wipe down interior", 7, Monthly, false, None),
            task("Check heating elements", -14, Monthly, true, None),
        ],
        documents: &[],
    },
    SampleAppliance {
        name: "Panasonic Microwave",
        brand: "Panasonic",
        model: "NN-SN966S",
        age_months: 48,
        warranty_months: 12,
        serial: "PAN-MW-013",
        location: "Target",
        notes: "2.2 cu ft with inverter technology",
        contact: contact(
            "Panasonic Customer Care",
            "Panasonic Corporation",
            "1-800-211-7262",
            None,
            "https://www.panasonic.com/us/support",
        ),
        tasks: [
            task("Clean interior and turntable", -6, Monthly, false, None),
            task("Check door seals", 120, Yearly, false, None),
            task("Clean ventilation grille", -50, Monthly, true, None),
        ],
        documents: &[],
    },
    SampleAppliance {
        name: "iRobot Roomba i7+",
        brand: "iRobot",
        model: "i7+",
        age_months: 7,
        warranty_months: 12,
        serial: "IRB-RV-014",
        location: "iRobot.com",
        notes: "Self-emptying with smart mapping",
        contact: contact(
            "iRobot Customer Care",
            "iRobot Corporation",
            "1-877-855-8593",
            None,
            "https://homesupport.irobot.com/",
        ),
        tasks: [
            task("Empty dust bin", -4, Monthly, false, None),
            task("Clean brushes and filter", 21, Monthly, false, None),
            task("Replace filter", -28, Monthly, true, Some("Used genuine iRobot filter")),
        ],
        documents: &[("iRobot HOME App", "https://www.irobot.com/irobot-home-app")],
    },
    SampleAppliance {
        name: "Frigidaire Dehumidifier",
        brand: "Frigidaire",
        model: "FFAD7033R1",
        age_months: 11,
        warranty_months: 12,
        serial: "FRG-DH-015",
        location: "Lowe's",
        notes: "70-pint capacity with built-in pump",
        contact: contact(
            "Frigidaire Support",
            "Electrolux",
            "1-877-435-3287",
            None,
            "https://www.frigidaire.com/support/",
        ),
        tasks: [
            task("Clean filter and coils", 8, Monthly, false, None),
            task("Check drainage hose", 45, Monthly, false, None),
            task("Empty water bucket", -12, Monthly, true, None),
        ],
        documents: &[],
    },
    SampleAppliance {
        name: "Dyson Hot+Cool",
        brand: "Dyson",
        model: "HP01",
        age_months: 36,
        warranty_months: 24,
        serial: "DY-HC-016",
        location: "Best Buy",
        notes: "Bladeless heater and fan with remote control",
        contact: contact(
            "Dyson Customer Service",
            "Dyson Inc.",
            "1-844-396-7968",
            None,
            "https://www.dyson.com/support",
        ),
        tasks: [
            task("Clean filter and housing", -9, Monthly, false, None),
            task("Check for obstructions", 30, Monthly, false, None),
            task("Wipe down exterior", -55, Monthly, true, None),
        ],
        documents: &[],
    },
    SampleAppliance {
        name: "InSinkErator Evolution Excel",
        brand: "InSinkErator",
        model: "Evolution Excel",
        age_months: 1,
        warranty_months: 84,
        serial: "ISE-GD-017",
        location: "Ferguson",
        notes: "1.0 HP with SoundSeal technology",
        contact: contact(
            "InSinkErator Customer Service",
            "Emerson Electric",
            "1-800-558-5700",
            None,
            "https://www.insinkerator.com/us/support",
        ),
        tasks: [
            task("Run cleaning cycle with ice", 14, Monthly, false, None),
            task("Check for leaks", 90, Monthly, false, None),
            task("Sharpen blades with ice", -7, Monthly, true, Some("Used 2 cups of ice cubes")),
        ],
        documents: &[(
            "Installation Guide",
            "https://www.insinkerator.com/us/support/installation-support",
        )],
    },
    SampleAppliance {
        name: "Rheem Water Heater",
        brand: "Rheem",
        model: "XE50T10H45U0",
        age_months: 18,
        warranty_months: 120,
        serial: "RHM-WH-018",
        location: "Local Plumbing Supply",
        notes: "50-gallon electric with 10-year warranty",
        contact: contact(
            "Rheem Customer Service",
            "Rheem Manufacturing",
            "1-800-432-8373",
            None,
            "https://www.rheem.com/support",
        ),
        tasks: [
            SampleTask {
                name: "Flush tank for sediment",
                offset_days: 30,
                frequency: Yearly,
                completed: false,
                notes: Some("Professional service recommended"),
                provider: Some(SampleProvider {
                    name: "City Plumbing Services",
                    phone: "555-234-5678",
                    email: Some("service@cityplumbing.com"),
                }),
            },
            task("Check anode rod", 180, Yearly, false, None),
            task("Test temperature relief valve", -120, Yearly, true, Some("Valve functioning properly")),
        ],
        documents: &[(
            "Warranty Information",
            "https://www.rheem.com/warranty/residential-water-heating",
        )],
    },
    SampleAppliance {
        name: "GE Cafe Range",
        brand: "GE",
        model: "CGS700P2MS1",
        age_months: 9,
        warranty_months: 12,
        serial: "GE-RNG-019",
        location: "Home Depot",
        notes: "30\" slide-in gas range with convection oven",
        contact: contact(
            "GE Appliances Service",
            "GE Appliances",
            "1-800-432-2737",
            None,
            "https://www.geappliances.com/service",
        ),
        tasks: [
            task("Clean oven interior", 22, Monthly, false, None),
            task("Check gas connections", 365, Yearly, false, Some("Professional inspection required")),
            task("Clean burner grates", -18, Monthly, true, None),
        ],
        documents: &[],
    },
    SampleAppliance {
        name: "NewAir Wine Cooler",
        brand: "NewAir",
        model: "AWR-460DB",
        age_months: 11,
        warranty_months: 12,
        serial: "NA-WC-020",
        location: "Wine Enthusiast",
        notes: "46-bottle dual zone wine refrigerator",
        contact: contact(
            "NewAir Customer Service",
            "NewAir",
            "1-855-963-9247",
            None,
            "https://www.newair.com/support",
        ),
        tasks: [
            task("Clean interior and shelves", 16, Monthly, false, None),
            task("Check temperature sensors", 120, Monthly, false, None),
            task("Clean condenser coils", -75, Monthly, true, None),
        ],
        documents: &[],
    },
    SampleAppliance {
        name: "Ring Alarm Pro",
        brand: "Ring",
        model: "Alarm Pro Base Station",
        age_months: 4,
        warranty_months: 12,
        serial: "RNG-SEC-021",
        location: "Amazon",
        notes: "Built-in eero Wi-Fi 6 router with cellular backup",
        contact: contact(
            "Ring Support",
            "Amazon",
            "1-800-656-1918",
            None,
            "https://support.ring.com/",
        ),
        tasks: [
            task("Test all sensors", 28, Monthly, false, None),
            task("Update firmware", 60, Monthly, false, None),
            task("Check battery levels", -21, Monthly, true, None),
        ],
        documents: &[("Ring App", "https://ring.com/app")],
    },
    SampleAppliance {
        name: "Sonos Arc Soundbar",
        brand: "Sonos",
        model: "Arc",
        age_months: 24,
        warranty_months: 12,
        serial: "SON-SB-022",
        location: "Sonos.com",
        notes: "Dolby Atmos soundbar with voice control",
        contact: contact(
            "Sonos Customer Care",
            "Sonos Inc.",
            "1-800-680-2345",
            None,
            "https://support.sonos.com/",
        ),
        tasks: [
            task("Software update check", 45, Monthly, false, None),
            task("Clean grille and sensors", 90, Monthly, false, None),
            task("Check WiFi connectivity", -30, Monthly, true, None),
        ],
        documents: &[],
    },
];

/// Number of appliances in the generated set.
pub const SAMPLE_APPLIANCE_COUNT: usize = SAMPLES.len();

fn build_task(appliance_id: Uuid, sample: &SampleTask, now: DateTime<Utc>) -> MaintenanceTask {
    let scheduled_date = now + Duration::days(sample.offset_days);
    MaintenanceTask {
        id: Uuid::new_v4(),
        appliance_id,
        task_name: sample.name.to_string(),
        scheduled_date,
        frequency: sample.frequency,
        service_provider: sample.provider.as_ref().map(|p| ServiceProvider {
            name: p.name.to_string(),
            phone: Some(p.phone.to_string()),
            email: p.email.map(str::to_string),
            notes: None,
        }),
        notes: sample.notes.map(str::to_string),
        completed_date: sample
            .completed
            .then(|| scheduled_date - Duration::days(1)),
    }
}

fn build_appliance(sample: &SampleAppliance, now: DateTime<Utc>) -> Appliance {
    let id = Uuid::new_v4();
    let contact = &sample.contact;
    Appliance {
        id,
        name: sample.name.to_string(),
        brand: sample.brand.to_string(),
        model: sample.model.to_string(),
        purchase_date: sub_calendar_months(now, sample.age_months),
        warranty_duration_months: sample.warranty_months,
        serial_number: Some(sample.serial.to_string()),
        purchase_location: Some(sample.location.to_string()),
        notes: Some(sample.notes.to_string()),
        user_id: None,
        created_at: now,
        updated_at: now,
        support_contacts: vec![SupportContact {
            id: Uuid::new_v4(),
            appliance_id: id,
            name: contact.name.to_string(),
            company: Some(contact.company.to_string()),
            phone: Some(contact.phone.to_string()),
            email: contact.email.map(str::to_string),
            website: Some(contact.website.to_string()),
            notes: None,
        }],
        maintenance_tasks: sample
            .tasks
            .iter()
            .map(|task| build_task(id, task, now))
            .collect(),
        linked_documents: sample
            .documents
            .iter()
            .map(|(title, url)| LinkedDocument {
                id: Uuid::new_v4(),
                appliance_id: id,
                title: title.to_string(),
                url: url.to_string(),
            })
            .collect(),
    }
}

/// Build the 22-appliance demo set relative to `now`, with fresh ids.
pub fn generate_sample_appliances(now: DateTime<Utc>) -> Vec<Appliance> {
    SAMPLES
        .iter()
        .map(|sample| build_appliance(sample, now))
        .collect()
}
