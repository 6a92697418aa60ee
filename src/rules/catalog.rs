//! Static substitution catalogs and known-token tables.
//!
//! These tables span the tool's entire revision history and are maintained
//! as versioned data, not derived at runtime. Three kinds of catalog exist:
//! per-cell terrain-code changes applied inside map literals, base-terrain
//! alias renames applied to `aliasof=` values, and global line-level renames
//! for tags, attributes, and asset paths.

/// Changes applied per cell to map and mask literals.
pub const MAP_CHANGES: &[(&str, &str)] = &[
    ("^Voha", "^Voa"),
    ("^Voh", "^Vo"),
    ("^Vhms", "^Vhha"),
    ("^Vhm", "^Vhh"),
    ("^Vcha", "^Vca"),
    ("^Vch", "^Vc"),
    ("^Vcm", "^Vc"),
    ("Ggf,", "Gg^Emf"),
    ("Qv,", "Mv"),
];

/// Base-terrain alias renames, applied to `aliasof=` attribute values.
pub const ALIAS_CHANGES: &[(&str, &str)] = &[
    // 1.11.8:
    ("Ch", "Ct"),
    ("Ds", "Dt"),
    ("Hh", "Ht"),
    ("Mm", "Mt"),
    ("Ss", "St"),
    ("Uu", "Ut"),
    ("Ww", "Wst"),
    ("Wo", "Wdt"),
    ("Wwr", "Wrt"),
    ("^Uf", "Uft"),
    // Vi -> Vit in 1.11.8, Vit -> Vt in 1.11.9.
    ("Vit", "Vt"),
    // 1.11.9:
    ("Vi", "Vt"),
];

/// Global line-level renames. Suppressed by the noconvert magic comment.
pub const LINE_CHANGES: &[(&str, &str)] = &[
    ("canrecruit=1", "canrecruit=yes"),
    ("canrecruit=0", "canrecruit=no"),
    // Fix a common typo
    ("agression=", "aggression="),
    // These changed just after 1.5.0
    ("[special_filter]", "[filter_attack]"),
    ("[wml_filter]", "[filter_wml]"),
    ("[unit_filter]", "[filter]"),
    ("[secondary_unit_filter]", "[filter_second]"),
    ("[attack_filter]", "[filter_attack]"),
    ("[secondary_attack_filter]", "[filter_second_attack]"),
    ("[special_filter_second]", "[filter_second_attack]"),
    ("[/special_filter]", "[/filter_attack]"),
    ("[/wml_filter]", "[/filter_wml]"),
    ("[/unit_filter]", "[/filter]"),
    ("[/secondary_unit_filter]", "[/filter_second]"),
    ("[/attack_filter]", "[/filter_attack]"),
    ("[/secondary_attack_filter]", "[/filter_second_attack]"),
    ("[/special_filter_second]", "[/filter_second_attack]"),
    ("grassland=", "flat="),
    ("tundra=", "frozen="),
    ("cavewall=", "impassable="),
    ("canyon=", "unwalkable="),
    // This changed after 1.5.2
    ("advanceto=", "advances_to="),
    // This changed after 1.5.5, to enable mechanical spellchecking
    ("sabre", "saber"),
    ("nr-sad.ogg", "sad.ogg"),
    // Changed after 1.5.7
    ("[debug_message]", "[wml_message]"),
    ("[/debug_message]", "[/wml_message]"),
    // Changed just before 1.5.9
    (
        "portraits/Alex_Jarocha-Ernst/drake-burner.png",
        "portraits/drakes/burner.png",
    ),
    (
        "portraits/Alex_Jarocha-Ernst/drake-clasher.png",
        "portraits/drakes/clasher.png",
    ),
    (
        "portraits/Alex_Jarocha-Ernst/drake-fighter.png",
        "portraits/drakes/fighter.png",
    ),
    (
        "portraits/Alex_Jarocha-Ernst/drake-glider.png",
        "portraits/drakes/glider.png",
    ),
    (
        "portraits/Alex_Jarocha-Ernst/ghoul.png",
        "portraits/undead/ghoul.png",
    ),
    (
        "portraits/Alex_Jarocha-Ernst/mermaid-initiate.png",
        "portraits/merfolk/initiate.png",
    ),
    (
        "portraits/Alex_Jarocha-Ernst/merman-fighter.png",
        "portraits/merfolk/fighter.png",
    ),
    (
        "portraits/Alex_Jarocha-Ernst/merman-hunter.png",
        "portraits/merfolk/hunter.png",
    ),
    (
        "portraits/Alex_Jarocha-Ernst/naga-fighter.png",
        "portraits/nagas/fighter.png",
    ),
    (
        "portraits/Alex_Jarocha-Ernst/nagini-fighter.png",
        "portraits/nagas/fighter+female.png",
    ),
    (
        "portraits/Alex_Jarocha-Ernst/orcish-assassin.png",
        "portraits/orcs/assassin.png",
    ),
    (
        "portraits/James_Woo/assassin.png",
        "portraits/humans/assassin.png",
    ),
    (
        "portraits/James_Woo/dwarf-guard.png",
        "portraits/dwarves/guard.png",
    ),
    (
        "portraits/James_Woo/orc-warlord.png",
        "portraits/orcs/warlord.png",
    ),
    (
        "portraits/James_Woo/orc-warlord2.png",
        "portraits/orcs/warlord2.png",
    ),
    (
        "portraits/James_Woo/orc-warlord3.png",
        "portraits/orcs/warlord3.png",
    ),
    (
        "portraits/James_Woo/orc-warlord4.png",
        "portraits/orcs/warlord4.png",
    ),
    (
        "portraits/James_Woo/orc-warlord5.png",
        "portraits/orcs/warlord5.png",
    ),
    (
        "portraits/James_Woo/troll.png",
        "portraits/trolls/troll.png",
    ),
    (
        "portraits/Kitty/elvish-archer.png",
        "portraits/elves/archer.png",
    ),
    (
        "portraits/Kitty/elvish-archer+female.png",
        "portraits/elves/archer+female.png",
    ),
    (
        "portraits/Kitty/elvish-captain.png",
        "portraits/elves/captain.png",
    ),
    (
        "portraits/Kitty/elvish-druid.png",
        "portraits/elves/druid.png",
    ),
    (
        "portraits/Kitty/elvish-fighter.png",
        "portraits/elves/fighter.png",
    ),
    ("portraits/Kitty/elvish-hero.png", "portraits/elves/hero.png"),
    (
        "portraits/Kitty/elvish-high-lord.png",
        "portraits/elves/high-lord.png",
    ),
    ("portraits/Kitty/elvish-lady.png", "portraits/elves/lady.png"),
    ("portraits/Kitty/elvish-lord.png", "portraits/elves/lord.png"),
    (
        "portraits/Kitty/elvish-marksman.png",
        "portraits/elves/marksman.png",
    ),
    (
        "portraits/Kitty/elvish-ranger.png",
        "portraits/elves/ranger.png",
    ),
    (
        "portraits/Kitty/elvish-scout.png",
        "portraits/elves/scout.png",
    ),
    (
        "portraits/Kitty/elvish-shaman.png",
        "portraits/elves/shaman.png",
    ),
    (
        "portraits/Kitty/elvish-shyde.png",
        "portraits/elves/shyde.png",
    ),
    (
        "portraits/Kitty/elvish-sorceress.png",
        "portraits/elves/sorceress.png",
    ),
    (
        "portraits/Kitty/human-mage.png",
        "portraits/humans/mage.png",
    ),
    (
        "portraits/Kitty/human-mage+female.png",
        "portraits/humans/mage+female.png",
    ),
    (
        "portraits/Kitty/human-necromancer.png",
        "portraits/humans/necromancer.png",
    ),
    (
        "portraits/Kitty/troll-whelp.png",
        "portraits/trolls/whelp.png",
    ),
    (
        "portraits/Kitty/undead-lich.png",
        "portraits/undead/lich.png",
    ),
    (
        "portraits/Philip_Barber/dwarf-dragonguard.png",
        "portraits/dwarves/dragonguard.png",
    ),
    (
        "portraits/Philip_Barber/dwarf-fighter.png",
        "portraits/dwarves/fighter.png",
    ),
    (
        "portraits/Philip_Barber/dwarf-lord.png",
        "portraits/dwarves/lord.png",
    ),
    (
        "portraits/Philip_Barber/dwarf-thunderer.png",
        "portraits/dwarves/thunderer.png",
    ),
    (
        "portraits/Philip_Barber/saurian-augur.png",
        "portraits/saurians/augur.png",
    ),
    (
        "portraits/Philip_Barber/saurian-skirmisher.png",
        "portraits/saurians/skirmisher.png",
    ),
    (
        "portraits/Philip_Barber/undead-death-knight.png",
        "portraits/undead/death-knight.png",
    ),
    // Changed just before 1.5.11
    (
        "titlescreen/landscapebattlefield.jpg",
        "story/landscape-battlefield.jpg",
    ),
    (
        "titlescreen/landscapebridge.jpg",
        "story/landscape-bridge.jpg",
    ),
    (
        "titlescreen/landscapecastle.jpg",
        "story/landscape-castle.jpg",
    ),
    ("LABEL_PERSISTANT", "LABEL_PERSISTENT"),
    // Changed just before 1.5.13
    ("targetting", "targeting"),
    // Changed just after 1.7 fork
    ("[stone]", "[petrify]"),
    ("[unstone]", "[unpetrify]"),
    ("[/stone]", "[/petrify]"),
    ("[/unstone]", "[/unpetrify]"),
    ("WEAPON_SPECIAL_STONE", "WEAPON_SPECIAL_PETRIFY"),
    ("SPECIAL_NOTE_STONE", "SPECIAL_NOTE_PETRIFY"),
    (".stoned", ".petrified"),
    ("stoned=", "petrified="),
    // Changed at rev 37390
    ("swing=", "value_second="),
    // Changed just before 1.7.3
    ("Drake Gladiator", "Drake Thrasher"),
    ("gladiator-", "thrasher-"),
    ("Drake Slasher", "Drake Arbiter"),
    ("slasher-", "arbiter-"),
    // Changes after 1.7.5
    (
        "portraits/nagas/fighter+female.png",
        "portraits/nagas/fighter.png",
    ),
    // Changes after 1.8rc1
    (
        "portraits/orcs/warlord.png",
        "portraits/orcs/transparent/warlord.png",
    ),
    (
        "portraits/orcs/warlord3.png",
        "portraits/orcs/transparent/grunt-2.png",
    ),
    (
        "portraits/orcs/warlord5.png",
        "portraits/orcs/transparent/grunt-3.png",
    ),
    // Changes just before 1.9.0
    ("flat/grass-r8", "flat/grass6"),
    ("flat/grass-r7", "flat/grass5"),
    ("flat/grass-r6", "flat/grass6"),
    ("flat/grass-r5", "flat/grass5"),
    ("flat/grass-r4", "flat/grass4"),
    ("flat/grass-r3", "flat/grass3"),
    ("flat/grass-r2", "flat/grass2"),
    ("flat/grass-r1", "flat/grass1"),
    // Correct earlier wmllint error
    ("second_value=", "value_second="),
    (".stones", ".petrifies"),
    ("stones=", "petrifies="),
    // Changes just before 1.9.1
    ("[colour_adjust]", "[color_adjust]"),
    ("[/colour_adjust]", "[/color_adjust]"),
    ("colour=", "color="),
    ("colour_lock=", "color_lock="),
    // Changes just before 1.9.2
    ("[removeitem]", "[remove_item]"),
    ("[/removeitem]", "[/remove_item]"),
    // Changes just before 1.11.0
    ("viewing_side", "side"),
    ("duration=level", "duration=scenario"),
    // Changed before 1.11.5 to incorporate 1.9.0 portraits
    (
        "portraits/orcs/warlord2.png",
        "portraits/orcs/transparent/grunt-5.png",
    ),
    (
        "portraits/orcs/warlord4.png",
        "portraits/orcs/transparent/grunt-6.png",
    ),
    // Changed before 1.11.8
    (
        "misc/schedule-dawn.png",
        "misc/time-schedules/default/schedule-dawn.png",
    ),
    (
        "misc/schedule-morning.png",
        "misc/time-schedules/default/schedule-morning.png",
    ),
    (
        "misc/schedule-afternoon.png",
        "misc/time-schedules/default/schedule-afternoon.png",
    ),
    (
        "misc/schedule-dusk.png",
        "misc/time-schedules/default/schedule-dusk.png",
    ),
    (
        "misc/schedule-firstwatch.png",
        "misc/time-schedules/default/schedule-firstwatch.png",
    ),
    (
        "misc/schedule-secondwatch.png",
        "misc/time-schedules/default/schedule-secondwatch.png",
    ),
    (
        "misc/schedule-indoors.png",
        "misc/time-schedules/schedule-indoors.png",
    ),
    (
        "misc/schedule-underground.png",
        "misc/time-schedules/schedule-underground.png",
    ),
    (
        "misc/schedule-underground-illum.png",
        "misc/time-schedules/schedule-underground-illum.png",
    ),
    (
        "misc/tod-schedule-24hrs.png",
        "misc/time-schedules/tod-schedule-24hrs.png",
    ),
    // Changed before 1.13.0 to fix frames for ragged flags
    ("FLAG_VARIANT ragged", "FLAG_VARIANT6 ragged"),
    ("FLAG_VARIANT \"ragged\"", "FLAG_VARIANT6 ragged"),
    // Changed in 1.11.15.
    ("fight_on_without_leader=yes", "defeat_condition=no_units_left"),
    ("fight_on_without_leader=no", "defeat_condition=no_leader_left"),
    (
        "remove_from_carryover_on_leaders_loss=yes",
        "remove_from_carryover_on_defeat=yes",
    ),
    (
        "remove_from_carryover_on_leaders_loss=no",
        "remove_from_carryover_on_defeat=no",
    ),
    // Changed in 1.13.2.
    ("[advance]", "[advancement]"),
    ("[/advance]", "[/advancement]"),
    ("{ABILITY_LEADERSHIP_LEVEL_1}", "{ABILITY_LEADERSHIP}"),
    ("{ABILITY_LEADERSHIP_LEVEL_2}", "{ABILITY_LEADERSHIP}"),
    ("{ABILITY_LEADERSHIP_LEVEL_3}", "{ABILITY_LEADERSHIP}"),
    ("{ABILITY_LEADERSHIP_LEVEL_4}", "{ABILITY_LEADERSHIP}"),
    ("{ABILITY_LEADERSHIP_LEVEL_5}", "{ABILITY_LEADERSHIP}"),
    ("misc/icon-amla-tough.png", "icons/amla-default.png"),
    // Consistency change for the Heavy Infantryman idle frames
    (
        "units/human-loyalists/heavy-infantry-idle-1.png",
        "units/human-loyalists/heavyinfantry-idle-1.png",
    ),
    (
        "units/human-loyalists/heavy-infantry-idle-2.png",
        "units/human-loyalists/heavyinfantry-idle-2.png",
    ),
    (
        "units/human-loyalists/heavy-infantry-idle-3.png",
        "units/human-loyalists/heavyinfantry-idle-3.png",
    ),
    // renamed khalifate to dunefolk
    ("id=khalifate", "id=dunefolk"),
    ("movement_type=khalifatefoot", "movement_type=dunefoot"),
    (
        "movement_type=khalifatearmoredfoot",
        "movement_type=dunearmoredfoot",
    ),
    ("movement_type=khalifatehorse", "movement_type=dunehorse"),
    (
        "movement_type=khalifatearmoredhorse",
        "movement_type=dunearmoredhorse",
    ),
    ("race=khalifate", "race=dunefolk"),
    ("{KHALIFATE_NAMES}", "{DUNEFOLK_NAMES}"),
    (
        "portraits/khalifate/hakim.png",
        "portraits/dunefolk/hakim.png",
    ),
    ("era_khalifate", "era_dunefolk"),
    ("era_khalifate_heroes", "era_dunefolk_heroes"),
    // renamed dunefolk units: images
    ("units/dunefolk/arif.png", "units/dunefolk/soldier.png"),
    ("units/dunefolk/batal.png", "units/dunefolk/wayfarer.png"),
    ("units/dunefolk/faris.png", "units/dunefolk/sunderer.png"),
    ("units/dunefolk/ghazi.png", "units/dunefolk/swordsman.png"),
    ("units/dunefolk/hadaf.png", "units/dunefolk/marauder.png"),
    ("units/dunefolk/hakim.png", "units/dunefolk/herbalist.png"),
    ("units/dunefolk/jawal.png", "units/dunefolk/windbolt.png"),
    ("units/dunefolk/jundi.png", "units/dunefolk/rover.png"),
    ("units/dunefolk/khaiyal.png", "units/dunefolk/piercer.png"),
    ("units/dunefolk/khalid.png", "units/dunefolk/warmaster.png"),
    ("units/dunefolk/mighwar.png", "units/dunefolk/harrier.png"),
    ("units/dunefolk/monawish.png", "units/dunefolk/skirmisher.png"),
    ("units/dunefolk/mudafi.png", "units/dunefolk/spearguard.png"),
    ("units/dunefolk/mufariq.png", "units/dunefolk/cataphract.png"),
    ("units/dunefolk/muharib.png", "units/dunefolk/explorer.png"),
    ("units/dunefolk/naffat.png", "units/dunefolk/burner.png"),
    ("units/dunefolk/qanas.png", "units/dunefolk/raider.png"),
    ("units/dunefolk/qatif-al-nar.png", "units/dunefolk/scorcher.png"),
    ("units/dunefolk/rami.png", "units/dunefolk/rider.png"),
    ("units/dunefolk/rasikh.png", "units/dunefolk/spearmaster.png"),
    ("units/dunefolk/saree.png", "units/dunefolk/horse-archer.png"),
    ("units/dunefolk/shuja.png", "units/dunefolk/blademaster.png"),
    ("units/dunefolk/tabib.png", "units/dunefolk/apothecary.png"),
    ("units/dunefolk/tineen.png", "units/dunefolk/firetrooper.png"),
    (
        "images/portraits/dunefolk/hakim.png",
        "images/portraits/dunefolk/herbalist.png",
    ),
    // second round of renaming
    ("units/dunefolk/ranger.png", "units/dunefolk/wayfarer.png"),
    ("units/dunefolk/windrider.png", "units/dunefolk/windbolt.png"),
    ("units/dunefolk/swiftrider.png", "units/dunefolk/horse-archer.png"),
    ("units/nagas/slasher.png", "units/nagas/dirkfang.png"),
    ("units/nagas/bladewhirler.png", "units/nagas/ophidian.png"),
    // unit ids
    ("Arif", "Dune Soldier"),
    ("Ghazi", "Dune Swordsman"),
    ("Shuja", "Dune Blademaster"),
    ("Khalid", "Dune Paragon"),
    ("Mudafi", "Dune Spearguard"),
    ("Rasikh", "Dune Spearmaster"),
    ("Hakim", "Dune Herbalist"),
    ("Tabib", "Dune Apothecary"),
    ("Jundi", "Dune Rover"),
    ("Monawish", "Dune Strider"),
    ("Mighwar", "Dune Harrier"),
    ("Muharib", "Dune Explorer"),
    ("Batal", "Dune Wayfarer"),
    ("Khaiyal", "Dune Rider"),
    ("Faris", "Dune Sunderer"),
    ("Mufariq", "Dune Cataphract"),
    ("Qanas", "Dune Raider"),
    ("Hadaf", "Dune Marauder"),
    ("Naffat", "Dune Burner"),
    ("Qatif-al-nar", "Dune Scorcher"),
    ("Qatif_al_nar", "Dune Scorcher"),
    ("Tineen", "Dune Firetrooper"),
    ("Rami", "Dune Rider"),
    ("Saree", "Dune Horse Archer"),
    ("Jawal", "Dune Windbolt"),
    // second round of renaming
    ("Dune Ranger", "Dune Wayfarer"),
    ("Dune Swiftrider", "Dune Horse Archer"),
    ("Dune Windrider", "Dune Windbolt"),
    ("Dune Piercer", "Dune Rider"),
    ("Naga Slasher", "Naga Dirkfang"),
    ("Naga Bladewhirler", "Naga Ophidian"),
    // Changed in 1.15.0: separate portrait for leader
    ("portraits/orcs/leader.png", "portraits/orcs/ruler.png"),
    ("portraits/orcs/leader-2.png", "portraits/orcs/ruler-2.png"),
];

/// Associations for the ability/note sanity checks.
///
/// A note can be associated with multiple abilities, but a given ability
/// maps to exactly one note. NOTE_ARCANE, NOTE_SPIRIT, and NOTE_DEFENSE_CAP
/// are derived from attack/movetype data rather than listed here.
pub const NOTE_PAIRS: &[(&str, &str)] = &[
    ("{ABILITY_HEALS}", "{NOTE_HEALS}"),
    ("{ABILITY_EXTRA_HEAL}", "{NOTE_EXTRA_HEAL}"),
    ("{ABILITY_UNPOISON}", "{NOTE_UNPOISON}"),
    ("{ABILITY_CURES}", "{NOTE_CURES}"),
    ("{ABILITY_REGENERATES}", "{NOTE_REGENERATES}"),
    ("{ABILITY_SELF_HEAL}", "{NOTE_SELF_HEAL}"),
    ("{ABILITY_STEADFAST}", "{NOTE_STEADFAST}"),
    ("{ABILITY_LEADERSHIP}", "{NOTE_LEADERSHIP}"),
    ("{ABILITY_SKIRMISHER}", "{NOTE_SKIRMISHER}"),
    ("{ABILITY_ILLUMINATES}", "{NOTE_ILLUMINATES}"),
    ("{ABILITY_TELEPORT}", "{NOTE_TELEPORT}"),
    ("{ABILITY_AMBUSH}", "{NOTE_AMBUSH}"),
    ("{ABILITY_NIGHTSTALK}", "{NOTE_NIGHTSTALK}"),
    ("{ABILITY_CONCEALMENT}", "{NOTE_CONCEALMENT}"),
    ("{ABILITY_SUBMERGE}", "{NOTE_SUBMERGE}"),
    ("{ABILITY_FEEDING}", "{NOTE_FEEDING}"),
    ("{ABILITY_INSPIRE}", "{NOTE_INSPIRE}"),
    ("{ABILITY_INITIATIVE}", "{NOTE_INITIATIVE}"),
    ("{ABILITY_DISTRACT}", "{NOTE_DISTRACT}"),
    ("{ABILITY_DISENGAGE}", "{NOTE_DISENGAGE}"),
    ("{ABILITY_FORMATION}", "{NOTE_FORMATION}"),
    ("{WEAPON_SPECIAL_BERSERK}", "{NOTE_BERSERK}"),
    ("{WEAPON_SPECIAL_BACKSTAB}", "{NOTE_BACKSTAB}"),
    // No closing brace deliberately; the macro takes arguments.
    ("{WEAPON_SPECIAL_PLAGUE", "{NOTE_PLAGUE}"),
    ("{WEAPON_SPECIAL_SLOW}", "{NOTE_SLOW}"),
    ("{WEAPON_SPECIAL_PETRIFY}", "{NOTE_PETRIFY}"),
    ("{WEAPON_SPECIAL_MARKSMAN}", "{NOTE_MARKSMAN}"),
    ("{WEAPON_SPECIAL_MAGICAL}", "{NOTE_MAGICAL}"),
    ("{WEAPON_SPECIAL_SWARM}", "{NOTE_SWARM}"),
    ("{WEAPON_SPECIAL_CHARGE}", "{NOTE_CHARGE}"),
    ("{WEAPON_SPECIAL_DRAIN}", "{NOTE_DRAIN}"),
    ("{WEAPON_SPECIAL_FIRSTSTRIKE}", "{NOTE_FIRSTSTRIKE}"),
    ("{WEAPON_SPECIAL_POISON}", "{NOTE_POISON}"),
    ("{WEAPON_SPECIAL_STUN}", "{NOTE_STUN}"),
    ("{WEAPON_SPECIAL_SHOCK}", "{NOTE_SHOCK}"),
    ("{WEAPON_SPECIAL_DAZE}", "{NOTE_DAZE}"),
];

/// The standard recruitable usage classes. Extendable per corpus via the
/// `usagetype` magic comment.
pub const USAGE_TYPES: &[&str] = &["scout", "fighter", "mixed fighter", "archer", "healer"];

/// Mainline campaign directory names, used to convert user-made content from
/// `data/campaigns` to `data/add-ons` without clobbering mainline paths.
pub const MAINLINE_CAMPAIGNS: &[&str] = &[
    "An_Orcish_Incursion",
    "Dead_Water",
    "Delfadors_Memoirs",
    "Descent_Into_Darkness",
    "Eastern_Invasion",
    "Heir_To_The_Throne",
    "Legend_of_Wesmere",
    "Liberty",
    "Northern_Rebirth",
    "Sceptre_of_Fire",
    "Secrets_of_the_Ancients",
    "Son_Of_The_Black_Eye",
    "The_Hammer_of_Thursagan",
    "The_Rise_Of_Wesnoth",
    "The_South_Guard",
    "tutorial",
    "Two_Brothers",
    "Under_the_Burning_Suns",
];

/// Attribute keys whose values get spell-checked.
pub const SPELLCHECK_KEYS: &[&str] = &[
    "cannot_use_message",
    "caption",
    "description",
    "description_inactive",
    "editor_name",
    "end_text",
    "help_topic_text",
    "message",
    "note",
    "story",
    "summary",
    "text",
    "title",
    "title2",
    "tooltip",
    "user_team_name",
];

/// Attributes that should carry translation marks.
pub fn is_translatable(key: &str) -> bool {
    const TRANSLATABLES: &[&str] = &[
        "abbrev",
        "base_names",
        "cannot_use_message",
        "caption",
        "current_player",
        "currently_doing_description",
        "description",
        "description_inactive",
        "editor_name",
        "end_text",
        "difficulty_descriptions",
        "female_message",
        "female_name_inactive",
        "female_names",
        "female_text",
        "help_text",
        "help_topic_text",
        "label",
        "male_message",
        "male_names",
        "male_text",
        "message",
        "name",
        "name_inactive",
        "new_game_title",
        "note",
        "option_description",
        "option_name",
        "order",
        "plural_name",
        "prefix",
        "reason",
        "set_description",
        "source",
        "story",
        "summary",
        "victory_string",
        "defeat_string",
        "gold_carryover_string",
        "notes_string",
        "text",
        "title",
        "title2",
        "tooltip",
        "translator_comment",
        "user_team_name",
        "side_name",
    ];
    TRANSLATABLES.contains(&key)
        || ((key.starts_with("type_") || key.starts_with("range_")) && key != "type_adv_tree")
}

/// Old-style inline highlight markup and its Pango replacement.
pub const PANGO_CONVERSIONS: &[(&str, &str, &str)] = &[
    ("~", "<b>", "</b>"),
    ("@", "<span color='green'>", "</span>"),
    ("#", "<span color='red'>", "</span>"),
    ("*", "<span size='large'>", "</span>"),
    ("`", "<span size='small'>", "</span>"),
];

/// Builtin global spelling exceptions: common English contractions and
/// setting jargon the stock dictionaries know nothing of.
pub const GLOBAL_SPELLINGS: &[&str] = &[
    "I'm",
    "I've",
    "I'd",
    "I'll",
    "heh",
    "ack",
    "advisor",
    "learnt",
    "amidst",
    // Fantasy/SF/occult jargon that we need
    "aerie",
    "aeon",
    "aide-de-camp",
    "axe",
    "ballista",
    "bided",
    "crafters",
    "glaive",
    "glyphs",
    "greatsword",
    "hells",
    "hellspawn",
    "hurrah",
    "morningstar",
    "newfound",
    "numbskulls",
    "overmatched",
    "sorceries",
    "spearman",
    "stygian",
    "teleport",
    "teleportation",
    "teleported",
    "terraform",
    "unavenged",
    "wildlands",
    // game jargon
    "melee",
    "arcane",
    "day/night",
    "gameplay",
    "hitpoint",
    "hitpoints",
    "FFA",
    "multiplayer",
    "playtesting",
    "respawn",
    "respawns",
    "WML",
    "HP",
    "XP",
    "AI",
    "ZOC",
    "YW",
    "L0",
    "L1",
    "L2",
    "L3",
    "MC",
    // archaisms
    "faugh",
    "hewn",
    "leapt",
    "dreamt",
    "spilt",
    "grandmam",
    "grandsire",
    "grandsires",
    "scry",
    "scrying",
    "scryed",
    "woodscraft",
    "princeling",
    "wilderlands",
    "ensorcels",
    "unlooked",
    "naphtha",
    "naïve",
    "onwards",
    // Sceptre of Fire gets spelled with -re.
    "sceptre",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_translatable_fixed_list() {
        assert!(is_translatable("message"));
        assert!(is_translatable("user_team_name"));
        assert!(!is_translatable("side"));
    }

    #[test]
    fn test_is_translatable_prefix_rule() {
        assert!(is_translatable("type_melee"));
        assert!(is_translatable("range_ranged"));
        assert!(!is_translatable("type_adv_tree"));
    }

    #[test]
    fn test_catalogs_nonempty() {
        assert!(!MAP_CHANGES.is_empty());
        assert!(!ALIAS_CHANGES.is_empty());
        assert!(LINE_CHANGES.len() > 100);
        assert!(!NOTE_PAIRS.is_empty());
    }
}
