// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Samplers, texture units, passes and materials.

use super::{fill_field, BinaryContext, BinaryParser};
use crate::material::{
    ImageData, Material, Pass, PixelFormat, Sampler, TextureImage, TextureUnit,
};
use std::path::PathBuf;
use tessera_core::chunk::parse;
use tessera_core::math::Extent2D;
use tessera_core::{Chunk, ChunkError, ChunkKind};

chunk_fields! {
    /// Fields of a sampler chunk.
    pub enum SamplerField {
        Name = NAME,
        MinFilter = SAMPLER_MIN_FILTER,
        MagFilter = SAMPLER_MAG_FILTER,
        MipFilter = SAMPLER_MIP_FILTER,
        MinLod = SAMPLER_MIN_LOD,
        MaxLod = SAMPLER_MAX_LOD,
        LodBias = SAMPLER_LOD_BIAS,
        WrapU = SAMPLER_WRAP_U,
        WrapV = SAMPLER_WRAP_V,
        WrapW = SAMPLER_WRAP_W,
        BorderColour = SAMPLER_BORDER_COLOUR,
        MaxAnisotropy = SAMPLER_MAX_ANISOTROPY,
    }
}

chunk_fields! {
    /// Fields of a texture unit chunk.
    pub enum TextureUnitField {
        File = TEXTURE_FILE,
        Format = TEXTURE_FORMAT,
        Dimensions = TEXTURE_DIMENSIONS,
        Data = TEXTURE_DATA,
        MapMode = TEXTURE_MAP,
        AlphaFunc = TEXTURE_ALPHA_FUNC,
        AlphaValue = TEXTURE_ALPHA_VALUE,
        AlphaBlend = TEXTURE_ALPHA_BLEND,
        AlphaArg0 = TEXTURE_ALPHA_BLEND0,
        AlphaArg1 = TEXTURE_ALPHA_BLEND1,
        AlphaArg2 = TEXTURE_ALPHA_BLEND2,
        RgbBlend = TEXTURE_RGB_BLEND,
        RgbArg0 = TEXTURE_RGB_BLEND0,
        RgbArg1 = TEXTURE_RGB_BLEND1,
        RgbArg2 = TEXTURE_RGB_BLEND2,
        BlendColour = TEXTURE_COLOUR,
        Channel = TEXTURE_CHANNEL,
        Sampler = TEXTURE_SAMPLER,
    }
}

chunk_fields! {
    /// Fields of a pass chunk.
    pub enum PassField {
        Ambient = PASS_AMBIENT,
        Diffuse = PASS_DIFFUSE,
        Specular = PASS_SPECULAR,
        Emissive = PASS_EMISSIVE,
        Shininess = PASS_SHININESS,
        Alpha = PASS_ALPHA,
        TwoSided = PASS_TWO_SIDED,
        BlendFunc = PASS_BLEND_FUNC,
        TextureUnit = TEXTURE_UNIT,
        Program = SHADER_PROGRAM,
    }
}

chunk_fields! {
    /// Fields of a material chunk.
    pub enum MaterialField {
        Name = NAME,
        Pass = PASS,
    }
}

impl BinaryParser for Sampler {
    const KIND: ChunkKind = ChunkKind::SAMPLER;
    type Field = SamplerField;
    type State = ();

    fn fill_fields(&self, chunk: &mut Chunk, _ctx: &mut BinaryContext<'_>) -> Result<(), ChunkError> {
        fill_field(self.name.as_str(), SamplerField::Name, chunk)?;
        fill_field(&self.min_filter, SamplerField::MinFilter, chunk)?;
        fill_field(&self.mag_filter, SamplerField::MagFilter, chunk)?;
        fill_field(&self.mip_filter, SamplerField::MipFilter, chunk)?;
        fill_field(&self.min_lod, SamplerField::MinLod, chunk)?;
        fill_field(&self.max_lod, SamplerField::MaxLod, chunk)?;
        fill_field(&self.lod_bias, SamplerField::LodBias, chunk)?;
        fill_field(&self.wrap[0], SamplerField::WrapU, chunk)?;
        fill_field(&self.wrap[1], SamplerField::WrapV, chunk)?;
        fill_field(&self.wrap[2], SamplerField::WrapW, chunk)?;
        fill_field(&self.border_colour, SamplerField::BorderColour, chunk)?;
        fill_field(&self.max_anisotropy, SamplerField::MaxAnisotropy, chunk)
    }

    fn parse_field(
        &mut self,
        field: SamplerField,
        chunk: &mut Chunk,
        _state: &mut (),
        _ctx: &mut BinaryContext<'_>,
    ) -> Result<(), ChunkError> {
        match field {
            SamplerField::Name => self.name = parse(chunk)?,
            SamplerField::MinFilter => self.min_filter = parse(chunk)?,
            SamplerField::MagFilter => self.mag_filter = parse(chunk)?,
            SamplerField::MipFilter => self.mip_filter = parse(chunk)?,
            SamplerField::MinLod => self.min_lod = parse(chunk)?,
            SamplerField::MaxLod => self.max_lod = parse(chunk)?,
            SamplerField::LodBias => self.lod_bias = parse(chunk)?,
            SamplerField::WrapU => self.wrap[0] = parse(chunk)?,
            SamplerField::WrapV => self.wrap[1] = parse(chunk)?,
            SamplerField::WrapW => self.wrap[2] = parse(chunk)?,
            SamplerField::BorderColour => self.border_colour = parse(chunk)?,
            SamplerField::MaxAnisotropy => self.max_anisotropy = parse(chunk)?,
        }
        Ok(())
    }
}

/// Image fields of a texture unit, assembled once every field is read.
#[derive(Debug, Default)]
pub struct ImageFields {
    file: Option<PathBuf>,
    format: Option<PixelFormat>,
    size: Option<Extent2D>,
    data: Option<Vec<u8>>,
}

impl BinaryParser for TextureUnit {
    const KIND: ChunkKind = ChunkKind::TEXTURE_UNIT;
    type Field = TextureUnitField;
    type State = ImageFields;

    fn fill_fields(&self, chunk: &mut Chunk, ctx: &mut BinaryContext<'_>) -> Result<(), ChunkError> {
        match &self.image {
            Some(TextureImage::File(path)) => {
                fill_field(ctx.relative_path(path).as_path(), TextureUnitField::File, chunk)?;
            }
            Some(TextureImage::Data(image)) => {
                fill_field(&image.format(), TextureUnitField::Format, chunk)?;
                fill_field(&image.size(), TextureUnitField::Dimensions, chunk)?;
                fill_field(image.data(), TextureUnitField::Data, chunk)?;
            }
            None => return Err(ChunkError::inconsistent("texture unit has no image")),
        }
        fill_field(&self.map_mode, TextureUnitField::MapMode, chunk)?;
        fill_field(&self.alpha_func, TextureUnitField::AlphaFunc, chunk)?;
        fill_field(&self.alpha_value, TextureUnitField::AlphaValue, chunk)?;
        fill_field(&self.alpha_blend, TextureUnitField::AlphaBlend, chunk)?;
        fill_field(&self.alpha_args[0], TextureUnitField::AlphaArg0, chunk)?;
        fill_field(&self.alpha_args[1], TextureUnitField::AlphaArg1, chunk)?;
        fill_field(&self.alpha_args[2], TextureUnitField::AlphaArg2, chunk)?;
        fill_field(&self.rgb_blend, TextureUnitField::RgbBlend, chunk)?;
        fill_field(&self.rgb_args[0], TextureUnitField::RgbArg0, chunk)?;
        fill_field(&self.rgb_args[1], TextureUnitField::RgbArg1, chunk)?;
        fill_field(&self.rgb_args[2], TextureUnitField::RgbArg2, chunk)?;
        fill_field(&self.blend_colour, TextureUnitField::BlendColour, chunk)?;
        fill_field(&self.channel, TextureUnitField::Channel, chunk)?;
        if let Some(sampler) = &self.sampler {
            fill_field(sampler.as_str(), TextureUnitField::Sampler, chunk)?;
        }
        Ok(())
    }

    fn parse_field(
        &mut self,
        field: TextureUnitField,
        chunk: &mut Chunk,
        image: &mut ImageFields,
        ctx: &mut BinaryContext<'_>,
    ) -> Result<(), ChunkError> {
        match field {
            TextureUnitField::File => {
                let stored: PathBuf = parse(chunk)?;
                image.file = Some(ctx.absolute_path(&stored));
            }
            TextureUnitField::Format => image.format = Some(parse(chunk)?),
            TextureUnitField::Dimensions => image.size = Some(parse(chunk)?),
            TextureUnitField::Data => image.data = Some(parse(chunk)?),
            TextureUnitField::MapMode => self.map_mode = parse(chunk)?,
            TextureUnitField::AlphaFunc => self.alpha_func = parse(chunk)?,
            TextureUnitField::AlphaValue => self.alpha_value = parse(chunk)?,
            TextureUnitField::AlphaBlend => self.alpha_blend = parse(chunk)?,
            TextureUnitField::AlphaArg0 => self.alpha_args[0] = parse(chunk)?,
            TextureUnitField::AlphaArg1 => self.alpha_args[1] = parse(chunk)?,
            TextureUnitField::AlphaArg2 => self.alpha_args[2] = parse(chunk)?,
            TextureUnitField::RgbBlend => self.rgb_blend = parse(chunk)?,
            TextureUnitField::RgbArg0 => self.rgb_args[0] = parse(chunk)?,
            TextureUnitField::RgbArg1 => self.rgb_args[1] = parse(chunk)?,
            TextureUnitField::RgbArg2 => self.rgb_args[2] = parse(chunk)?,
            TextureUnitField::BlendColour => self.blend_colour = parse(chunk)?,
            TextureUnitField::Channel => self.channel = parse(chunk)?,
            TextureUnitField::Sampler => self.sampler = Some(parse(chunk)?),
        }
        Ok(())
    }

    fn finish_parse(&mut self, image: ImageFields, _ctx: &mut BinaryContext<'_>) -> Result<(), ChunkError> {
        self.image = match image {
            ImageFields { file: Some(path), .. } => Some(TextureImage::File(path)),
            ImageFields {
                format: Some(format),
                size: Some(size),
                data: Some(data),
                ..
            } => {
                let data = ImageData::new(format, size, data).map_err(ChunkError::inconsistent)?;
                Some(TextureImage::Data(data))
            }
            ImageFields { data: Some(_), .. } => {
                return Err(ChunkError::inconsistent(
                    "texture data without format or dimensions",
                ));
            }
            _ => return Err(ChunkError::inconsistent("texture unit has no image")),
        };
        Ok(())
    }
}

impl BinaryParser for Pass {
    const KIND: ChunkKind = ChunkKind::PASS;
    type Field = PassField;
    type State = ();

    fn fill_fields(&self, chunk: &mut Chunk, ctx: &mut BinaryContext<'_>) -> Result<(), ChunkError> {
        fill_field(&self.ambient, PassField::Ambient, chunk)?;
        fill_field(&self.diffuse, PassField::Diffuse, chunk)?;
        fill_field(&self.specular, PassField::Specular, chunk)?;
        fill_field(&self.emissive, PassField::Emissive, chunk)?;
        fill_field(&self.shininess, PassField::Shininess, chunk)?;
        fill_field(&self.alpha, PassField::Alpha, chunk)?;
        fill_field(&self.two_sided, PassField::TwoSided, chunk)?;
        fill_field(&self.blend, PassField::BlendFunc, chunk)?;
        for (index, unit) in self.texture_units().iter().enumerate() {
            if !unit.is_textured() {
                log::warn!("Skipping texture unit {index}: it has no image");
                continue;
            }
            unit.fill(chunk, ctx)?;
        }
        if let Some(program) = self.program() {
            program.fill(chunk, ctx)?;
        }
        Ok(())
    }

    fn start_parse(&mut self, _ctx: &mut BinaryContext<'_>) {
        self.clear_texture_units();
    }

    fn parse_field(
        &mut self,
        field: PassField,
        chunk: &mut Chunk,
        _state: &mut (),
        ctx: &mut BinaryContext<'_>,
    ) -> Result<(), ChunkError> {
        match field {
            PassField::Ambient => self.ambient = parse(chunk)?,
            PassField::Diffuse => self.diffuse = parse(chunk)?,
            PassField::Specular => self.specular = parse(chunk)?,
            PassField::Emissive => self.emissive = parse(chunk)?,
            PassField::Shininess => self.shininess = parse(chunk)?,
            PassField::Alpha => self.alpha = parse(chunk)?,
            PassField::TwoSided => self.two_sided = parse(chunk)?,
            PassField::BlendFunc => self.blend = parse(chunk)?,
            PassField::TextureUnit => {
                let mut unit = TextureUnit::new();
                unit.parse(chunk, ctx)?;
                self.add_texture_unit(unit);
            }
            PassField::Program => {
                let mut program = ctx.shaders().create_program("");
                program.parse(chunk, ctx)?;
                self.set_program(program);
            }
        }
        Ok(())
    }
}

impl BinaryParser for Material {
    const KIND: ChunkKind = ChunkKind::MATERIAL;
    type Field = MaterialField;
    type State = ();

    fn fill_fields(&self, chunk: &mut Chunk, ctx: &mut BinaryContext<'_>) -> Result<(), ChunkError> {
        fill_field(self.name.as_str(), MaterialField::Name, chunk)?;
        for pass in self.passes() {
            pass.fill(chunk, ctx)?;
        }
        Ok(())
    }

    fn start_parse(&mut self, _ctx: &mut BinaryContext<'_>) {
        self.clear_passes();
    }

    fn parse_field(
        &mut self,
        field: MaterialField,
        chunk: &mut Chunk,
        _state: &mut (),
        ctx: &mut BinaryContext<'_>,
    ) -> Result<(), ChunkError> {
        match field {
            MaterialField::Name => self.name = parse(chunk)?,
            MaterialField::Pass => {
                let mut pass = Pass::new();
                pass.parse(chunk, ctx)?;
                self.add_pass(pass);
            }
        }
        Ok(())
    }
}
