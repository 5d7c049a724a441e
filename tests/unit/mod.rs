// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

mod bing_adapter_test;
mod google_adapter_test;
mod settings_test;
