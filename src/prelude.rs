// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub use anyhow::{anyhow, bail, Context, Result};

pub use glam::Vec3;

pub use itertools::Itertools;
pub use std::collections::{HashMap, HashSet};

pub use crate::solid;
pub use crate::solid::*;

pub use crate::utils::*;
